//! Record types.

use crate::key::{normalize, RecordKey};
use serde::Serialize;
use std::fmt;

/// Surrogate identifier of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RowId(i64);

impl RowId {
    /// Creates a row ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row:{}", self.0)
    }
}

/// A key plus its description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    /// Natural key.
    pub key: RecordKey,
    /// Normalized description.
    pub description: String,
}

impl Record {
    /// Creates a record from present values.
    #[must_use]
    pub fn new(
        dep_code: impl Into<String>,
        dep_job: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: RecordKey::new(dep_code, dep_job),
            description: description.into(),
        }
    }

    /// Creates a record from possibly absent values.
    #[must_use]
    pub fn from_nullable(
        dep_code: Option<String>,
        dep_job: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            key: RecordKey::from_nullable(dep_code, dep_job),
            description: normalize(description),
        }
    }

    /// Returns the department code.
    #[must_use]
    pub fn dep_code(&self) -> &str {
        self.key.dep_code()
    }

    /// Returns the department job.
    #[must_use]
    pub fn dep_job(&self) -> &str {
        self.key.dep_job()
    }
}

/// A record read from the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbRecord {
    /// Row identifier.
    pub id: RowId,
    /// Row content.
    pub record: Record,
}

impl DbRecord {
    /// Creates a table record.
    #[must_use]
    pub fn new(id: RowId, record: Record) -> Self {
        Self { id, record }
    }

    /// Returns the natural key.
    #[must_use]
    pub fn key(&self) -> &RecordKey {
        &self.record.key
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.record.description
    }
}

impl From<DbRecord> for Record {
    fn from(row: DbRecord) -> Self {
        row.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_nullable_normalizes_every_field() {
        let record = Record::from_nullable(None, Some("ENG".into()), None);
        assert_eq!(record.dep_code(), "");
        assert_eq!(record.dep_job(), "ENG");
        assert_eq!(record.description, "");
        assert_eq!(record, Record::new("", "ENG", ""));
    }

    #[test]
    fn db_record_accessors() {
        let row = DbRecord::new(RowId::new(7), Record::new("10", "ENG", "Engineer"));
        assert_eq!(row.id.as_i64(), 7);
        assert_eq!(row.key(), &RecordKey::new("10", "ENG"));
        assert_eq!(row.description(), "Engineer");
        assert_eq!(row.id.to_string(), "row:7");
    }

    #[test]
    fn row_ids_are_opaque_and_ordered() {
        let low = RowId::new(2);
        let high = RowId::new(10);
        assert!(low < high);
        assert_eq!(high.as_i64(), 10);
        assert_eq!(RowId::new(high.as_i64()), high);
    }
}
