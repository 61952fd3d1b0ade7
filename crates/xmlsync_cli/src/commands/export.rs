//! Export command implementation.

use super::{print_report, progress_for};
use crate::OutputFormat;
use std::path::Path;
use xmlsync_engine::{AppConfig, SyncEngine};

/// Runs the export command.
pub fn run(
    config: &AppConfig,
    config_path: &Path,
    file: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = SyncEngine::connect(config, config_path, progress_for(format))?;
    let report = engine.export_to_file(file)?;
    print_report(&report, format)?;
    Ok(())
}
