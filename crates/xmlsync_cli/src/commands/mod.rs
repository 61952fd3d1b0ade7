//! CLI command implementations.

pub mod export;
pub mod sync;

use crate::OutputFormat;
use serde::Serialize;
use std::fmt::Display;
use xmlsync_engine::ConsoleProgress;

/// Prints a report in the requested format.
pub fn print_report<R>(report: &R, format: OutputFormat) -> Result<(), serde_json::Error>
where
    R: Serialize + Display,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => println!("{report}"),
    }
    Ok(())
}

/// Progress goes to stderr when stdout carries JSON.
pub fn progress_for(format: OutputFormat) -> ConsoleProgress {
    match format {
        OutputFormat::Text => ConsoleProgress::stdout(),
        OutputFormat::Json => ConsoleProgress::stderr(),
    }
}
