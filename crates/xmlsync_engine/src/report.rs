//! Results of export and sync calls.

use crate::state::SyncPhase;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Outcome of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// File the table was reconciled with.
    pub file: PathBuf,
    /// Records in the file.
    pub xml_records: usize,
    /// Rows in the table before the sync.
    pub db_rows: usize,
    /// Rows whose description already matched.
    pub unchanged: u64,
    /// Rows whose description was replaced.
    pub updated: u64,
    /// Rows with no counterpart in the file.
    pub deleted: u64,
    /// File records with no counterpart in the table.
    pub inserted: u64,
    /// Whether the changes were rolled back instead of committed.
    pub dry_run: bool,
    /// Phase the engine finished in.
    pub phase: SyncPhase,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl SyncReport {
    /// Total number of mutations issued.
    pub fn mutations(&self) -> u64 {
        self.updated + self.deleted + self.inserted
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File:        {}", self.file.display())?;
        writeln!(f, "XML records: {}", self.xml_records)?;
        writeln!(f, "DB rows:     {}", self.db_rows)?;
        writeln!(f, "Unchanged:   {}", self.unchanged)?;
        writeln!(f, "Updated:     {}", self.updated)?;
        writeln!(f, "Deleted:     {}", self.deleted)?;
        writeln!(f, "Inserted:    {}", self.inserted)?;
        if self.dry_run {
            writeln!(f, "Dry run:     changes rolled back")?;
        }
        write!(f, "Duration:    {} ms", self.duration_ms)
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// File written.
    pub file: PathBuf,
    /// Records written.
    pub records: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File:     {}", self.file.display())?;
        writeln!(f, "Records:  {}", self.records)?;
        write!(f, "Duration: {} ms", self.duration_ms)
    }
}
