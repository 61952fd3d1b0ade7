//! Application configuration.

use crate::error::{SyncError, SyncResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use xmlsync_db::DatabaseConfig;

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "xmlsync.toml";

/// Settings loaded once per process, before any database or file work.
///
/// ```toml
/// log_file = "xmlsync.log"
///
/// [database]
/// url = "data/xmlsync.db"
/// table = "dep_codes"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Connection settings.
    pub database: DatabaseConfig,
    /// File that log output is appended to, in addition to stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Creates a configuration with no log file.
    pub fn new(database: DatabaseConfig) -> Self {
        Self {
            database,
            log_file: None,
        }
    }

    /// Sets the log file.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Loads the configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the file is missing, unreadable or
    /// not a valid configuration.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SyncError::config(path, e.to_string()))?;
        let config = Self::from_toml(&text).map_err(|e| SyncError::config(path, e))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e: toml::de::Error| e.message().to_string())
    }
}
