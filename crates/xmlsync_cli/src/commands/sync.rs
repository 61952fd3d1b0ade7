//! Sync command implementation.

use super::{print_report, progress_for};
use crate::OutputFormat;
use std::path::Path;
use xmlsync_engine::{AppConfig, SyncEngine, SyncOptions};

/// Runs the sync command.
pub fn run(
    config: &AppConfig,
    config_path: &Path,
    file: &Path,
    dry_run: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = SyncEngine::connect(config, config_path, progress_for(format))?;
    let report = engine.sync_with_options(file, SyncOptions { dry_run })?;
    print_report(&report, format)?;
    Ok(())
}
