//! # XmlSync Engine
//!
//! Reconciles one database table with an XML record file.
//!
//! This crate provides:
//! - [`SyncEngine::sync_with_file`] - make the table match the file
//! - [`SyncEngine::export_to_file`] - dump the table into a file
//! - [`AppConfig`] - configuration loaded from `xmlsync.toml`
//! - [`ProgressSink`] - injected status-line reporting
//!
//! ## Sync model
//!
//! A sync call moves through
//! `LoadingXml → ScanningDb → InsertingNew → Committed`:
//! 1. Load the file into a key-unique set (duplicates abort here, before
//!    any transaction exists)
//! 2. Stream the table; a row whose key is in the set is kept or updated
//!    and its entry removed, any other row is deleted
//! 3. Insert whatever is left in the set
//! 4. Commit
//!
//! Any failure after step 1 rolls the transaction back and moves the
//! engine to `Failed`. The file is never written by a sync.
//!
//! ## Key Invariants
//!
//! - The file wins: after a successful sync the table holds exactly the
//!   file's records
//! - Rows that did not change keep their identifier
//! - A second sync with the same file issues no mutations
//! - No partial sync is ever visible

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod export;
mod progress;
mod reconcile;
mod report;
mod state;

pub use config::{AppConfig, DEFAULT_CONFIG_FILE};
pub use error::{ErrorKind, SyncError, SyncResult};
pub use progress::{BufferProgress, ConsoleProgress, NoProgress, ProgressSink};
pub use reconcile::classify;
pub use report::{ExportReport, SyncReport};
pub use state::{SyncEngine, SyncOptions, SyncPhase};
