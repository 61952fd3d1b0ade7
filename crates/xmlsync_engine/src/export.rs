//! Export routine.

use crate::error::SyncResult;
use crate::progress::ProgressSink;
use crate::report::ExportReport;
use crate::state::{elapsed_ms, SyncEngine};
use std::path::Path;
use std::time::Instant;
use xmlsync_record::Record;
use xmlsync_xml::XmlFileWriter;

impl<P: ProgressSink> SyncEngine<P> {
    /// Writes every table row to `path`, in table order.
    ///
    /// The file is replaced atomically: if the export fails, an existing
    /// file at `path` is left as it was. No transaction is opened.
    pub fn export_to_file(&mut self, path: &Path) -> SyncResult<ExportReport> {
        self.progress.report(&format!(
            "Exporting data from the database to \"{}\"",
            path.display()
        ));
        let started = Instant::now();

        let mut writer = XmlFileWriter::create(path)?;
        self.db.for_each_row(|row| -> SyncResult<()> {
            writer.write_record(&Record::from(row))?;
            Ok(())
        })?;
        let records = writer.commit()?;

        tracing::info!(file = %path.display(), records, "export finished");
        self.progress.report("Export complete");

        Ok(ExportReport {
            file: path.to_path_buf(),
            records,
            duration_ms: elapsed_ms(started),
        })
    }
}
