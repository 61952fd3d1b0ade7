//! Error types for the sync engine.

use std::path::PathBuf;
use thiserror::Error;
use xmlsync_db::DbError;
use xmlsync_xml::XmlError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Broad classes of failure, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration file missing, unreadable or invalid.
    Config,
    /// Database connection could not be established.
    Connection,
    /// XML file malformed.
    Parse,
    /// Two XML records share a key.
    DuplicateKey,
    /// A statement failed inside the transaction.
    DbOperation,
    /// The XML file could not be read or written.
    FileIo,
}

/// Errors that can occur during export or sync.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration could not be loaded.
    #[error("cannot load configuration {}: {message}", .path.display())]
    Config {
        /// Configuration file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Database connection could not be established.
    #[error("cannot connect to the database, check the settings in {}: {source}", .config_path.display())]
    Connection {
        /// Configuration file holding the connection settings.
        config_path: PathBuf,
        /// Underlying error.
        #[source]
        source: DbError,
    },

    /// Reading or writing the XML file failed.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// Database error during export or sync.
    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl SyncError {
    /// Creates a configuration error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Config { .. } => ErrorKind::Config,
            SyncError::Connection { .. } => ErrorKind::Connection,
            SyncError::Xml(XmlError::Parse { .. }) => ErrorKind::Parse,
            SyncError::Xml(XmlError::DuplicateKey { .. }) => ErrorKind::DuplicateKey,
            SyncError::Xml(XmlError::Read { .. } | XmlError::Write { .. }) => ErrorKind::FileIo,
            SyncError::Database(e) if e.is_connection_error() => ErrorKind::Connection,
            SyncError::Database(_) => ErrorKind::DbOperation,
        }
    }
}
