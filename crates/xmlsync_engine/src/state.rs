//! Sync engine state machine.

use crate::config::AppConfig;
use crate::error::{SyncError, SyncResult};
use crate::progress::ProgressSink;
use crate::reconcile::classify;
use crate::report::SyncReport;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use xmlsync_db::{Database, RowAction};

/// Where a sync call currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// No sync has run yet.
    Idle,
    /// Reading the XML file.
    LoadingXml,
    /// Streaming the table and updating or deleting rows.
    ScanningDb,
    /// Inserting records the table did not have.
    InsertingNew,
    /// Changes are committed.
    Committed,
    /// A dry run finished and its changes were rolled back.
    RolledBack,
    /// The last call failed; nothing was changed.
    Failed,
}

/// Per-call sync options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Roll back instead of committing.
    pub dry_run: bool,
}

impl SyncOptions {
    /// Options for a dry run.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

/// Reconciles one table with XML record files.
///
/// The engine owns the database connection; one engine serves one
/// export or sync at a time.
pub struct SyncEngine<P: ProgressSink> {
    pub(crate) db: Database,
    pub(crate) progress: P,
    phase: SyncPhase,
}

impl<P: ProgressSink> SyncEngine<P> {
    /// Creates an engine over an open database.
    pub fn new(db: Database, progress: P) -> Self {
        Self {
            db,
            progress,
            phase: SyncPhase::Idle,
        }
    }

    /// Opens the configured database and creates an engine over it.
    ///
    /// `config_path` is named in the error if the connection fails.
    pub fn connect(config: &AppConfig, config_path: &Path, progress: P) -> SyncResult<Self> {
        let db = Database::open(&config.database).map_err(|source| SyncError::Connection {
            config_path: config_path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(db, progress))
    }

    /// Returns the phase of the last or current call.
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Returns the progress sink.
    pub fn progress(&self) -> &P {
        &self.progress
    }

    /// Returns the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Consumes the engine, returning the database.
    pub fn into_database(self) -> Database {
        self.db
    }

    /// Makes the table hold exactly the records in `path`.
    pub fn sync_with_file(&mut self, path: &Path) -> SyncResult<SyncReport> {
        self.sync_with_options(path, SyncOptions::default())
    }

    /// Runs a sync with explicit options.
    ///
    /// # Errors
    ///
    /// Load errors ([`ErrorKind::Parse`], [`ErrorKind::DuplicateKey`],
    /// [`ErrorKind::FileIo`]) are returned before a transaction is opened.
    /// Database errors roll the whole transaction back. In both cases the
    /// table is unchanged and the engine ends in [`SyncPhase::Failed`].
    ///
    /// [`ErrorKind::Parse`]: crate::ErrorKind::Parse
    /// [`ErrorKind::DuplicateKey`]: crate::ErrorKind::DuplicateKey
    /// [`ErrorKind::FileIo`]: crate::ErrorKind::FileIo
    pub fn sync_with_options(
        &mut self,
        path: &Path,
        options: SyncOptions,
    ) -> SyncResult<SyncReport> {
        self.progress.report(&format!(
            "Synchronizing the database with \"{}\"",
            path.display()
        ));
        let started = Instant::now();

        match self.run_sync(path, options, started) {
            Ok(report) => {
                tracing::info!(
                    file = %path.display(),
                    updated = report.updated,
                    deleted = report.deleted,
                    inserted = report.inserted,
                    dry_run = report.dry_run,
                    "sync finished"
                );
                self.progress.report("Synchronization complete");
                Ok(report)
            }
            Err(err) => {
                tracing::error!(
                    file = %path.display(),
                    phase = ?self.phase,
                    error = %err,
                    "sync failed"
                );
                self.set_phase(SyncPhase::Failed);
                Err(err)
            }
        }
    }

    fn run_sync(
        &mut self,
        path: &Path,
        options: SyncOptions,
        started: Instant,
    ) -> SyncResult<SyncReport> {
        self.set_phase(SyncPhase::LoadingXml);
        let mut pending = xmlsync_xml::read_records(path)?;
        let xml_records = pending.len();

        let Self { db, phase, .. } = self;
        let body = |txn: &mut xmlsync_db::TableTransaction<'_>| -> SyncResult<_> {
            transition(phase, SyncPhase::ScanningDb);
            let mut unchanged = 0u64;
            let db_rows = txn.scan(|row| {
                let action = classify(row, &mut pending);
                if action == RowAction::Keep {
                    unchanged += 1;
                }
                action
            })?;

            transition(phase, SyncPhase::InsertingNew);
            for record in pending.into_records() {
                txn.insert(&record)?;
            }
            Ok((db_rows, unchanged, txn.stats()))
        };

        let (db_rows, unchanged, stats) = if options.dry_run {
            db.dry_run(body)?
        } else {
            db.transaction(body)?
        };

        self.set_phase(if options.dry_run {
            SyncPhase::RolledBack
        } else {
            SyncPhase::Committed
        });

        Ok(SyncReport {
            file: path.to_path_buf(),
            xml_records,
            db_rows,
            unchanged,
            updated: stats.updated,
            deleted: stats.deleted,
            inserted: stats.inserted,
            dry_run: options.dry_run,
            phase: self.phase,
            duration_ms: elapsed_ms(started),
        })
    }

    pub(crate) fn set_phase(&mut self, next: SyncPhase) {
        transition(&mut self.phase, next);
    }
}

fn transition(phase: &mut SyncPhase, next: SyncPhase) {
    tracing::debug!(from = ?*phase, to = ?next, "sync phase");
    *phase = next;
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
