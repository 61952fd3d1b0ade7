//! Composite natural key.

use serde::Serialize;
use std::fmt;

/// Normalizes an optional value to a string, mapping `None` to `""`.
#[inline]
#[must_use]
pub fn normalize(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// The `(depCode, depJob)` pair identifying a logical record.
///
/// Keys are immutable and always hold normalized strings; there is no way
/// to build one with an absent field. Two keys are equal iff both fields
/// match exactly. A key with both fields empty is a valid key like any
/// other.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordKey {
    dep_code: String,
    dep_job: String,
}

impl RecordKey {
    /// Creates a key from present values.
    #[must_use]
    pub fn new(dep_code: impl Into<String>, dep_job: impl Into<String>) -> Self {
        Self {
            dep_code: dep_code.into(),
            dep_job: dep_job.into(),
        }
    }

    /// Creates a key from possibly absent values.
    #[must_use]
    pub fn from_nullable(dep_code: Option<String>, dep_job: Option<String>) -> Self {
        Self::new(normalize(dep_code), normalize(dep_job))
    }

    /// Returns the department code.
    #[inline]
    #[must_use]
    pub fn dep_code(&self) -> &str {
        &self.dep_code
    }

    /// Returns the department job.
    #[inline]
    #[must_use]
    pub fn dep_job(&self) -> &str {
        &self.dep_job
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depCode=\"{}\", depJob=\"{}\"", self.dep_code, self.dep_job)
    }
}
