//! Error types for the XML adapter.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use xmlsync_record::RecordKey;

/// Result type for XML operations.
pub type XmlResult<T> = Result<T, XmlError>;

/// Errors that can occur while reading or writing record files.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The file could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not well-formed or does not follow the record layout.
    #[error("malformed XML in {}: {message}", .path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Two records share the same normalized key.
    #[error("{} contains more than one record with {key}", .path.display())]
    DuplicateKey {
        /// File being parsed.
        path: PathBuf,
        /// The offending key.
        key: RecordKey,
    },

    /// The file could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl XmlError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
