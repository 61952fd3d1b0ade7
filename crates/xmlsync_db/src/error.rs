//! Error types for the database adapter.

use std::fmt;
use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// The database operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Reading rows through the cursor.
    Scan,
    /// Inserting a row.
    Insert,
    /// Updating a row's description.
    Update,
    /// Deleting a row.
    Delete,
    /// Beginning a transaction.
    Begin,
    /// Committing a transaction.
    Commit,
    /// Rolling back a transaction.
    Rollback,
    /// Inspecting or creating the table.
    Schema,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Scan => "scan",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Begin => "begin",
            Operation::Commit => "commit",
            Operation::Rollback => "rollback",
            Operation::Schema => "schema",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while talking to the database.
#[derive(Debug, Error)]
pub enum DbError {
    /// The connection could not be established.
    #[error("cannot connect to {url}: {source}")]
    Connection {
        /// Database URL from the configuration.
        url: String,
        /// Underlying SQLite error.
        #[source]
        source: rusqlite::Error,
    },

    /// The configured table does not exist.
    #[error("table {table} does not exist")]
    MissingTable {
        /// Table name.
        table: String,
    },

    /// The configured table name is not a plain SQL identifier.
    #[error("invalid table name {0:?}")]
    InvalidTableName(String),

    /// A statement failed.
    #[error("{operation} failed: {source}")]
    Operation {
        /// What was being done.
        operation: Operation,
        /// Underlying SQLite error.
        #[source]
        source: rusqlite::Error,
    },
}

impl DbError {
    /// Creates an operation error.
    pub fn operation(operation: Operation, source: rusqlite::Error) -> Self {
        Self::Operation { operation, source }
    }

    /// Returns a closure wrapping an SQLite error for `operation`.
    pub(crate) fn during(operation: Operation) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::operation(operation, source)
    }

    /// Returns true if the error happened while establishing the connection.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DbError::Connection { .. } | DbError::MissingTable { .. } | DbError::InvalidTableName(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_display() {
        let err = DbError::operation(
            Operation::Update,
            rusqlite::Error::InvalidQuery,
        );
        assert!(err.to_string().starts_with("update failed"));
        assert!(!err.is_connection_error());
    }

    #[test]
    fn bootstrap_errors_are_connection_errors() {
        assert!(DbError::MissingTable {
            table: "dep_codes".into()
        }
        .is_connection_error());
        assert!(DbError::InvalidTableName("x;".into()).is_connection_error());
    }
}
