//! Record file writer.

use crate::error::{XmlError, XmlResult};
use crate::{DEP_CODE, DEP_JOB, DESCRIPTION, INDENT, RECORD_ELEMENT, ROOT_ELEMENT};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use xmlsync_record::Record;

/// Streams records into an indented XML document.
///
/// The declaration and the opening root tag are written by
/// [`RecordWriter::new`]; [`RecordWriter::finish`] closes the root.
pub struct RecordWriter<W: Write> {
    writer: Writer<W>,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    /// Starts a document on `inner`.
    pub fn new(inner: W) -> io::Result<Self> {
        let mut writer = Writer::new_with_indent(inner, b' ', INDENT);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(io::Error::other)?;
        writer
            .write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))
            .map_err(io::Error::other)?;
        Ok(Self { writer, written: 0 })
    }

    /// Appends one record element.
    pub fn write_record(&mut self, record: &Record) -> io::Result<()> {
        self.event(Event::Start(BytesStart::new(RECORD_ELEMENT)))?;
        self.field(DEP_CODE, record.dep_code())?;
        self.field(DEP_JOB, record.dep_job())?;
        self.field(DESCRIPTION, &record.description)?;
        self.event(Event::End(BytesEnd::new(RECORD_ELEMENT)))?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Closes the root element and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
        let mut inner = self.writer.into_inner();
        inner.write_all(b"\n")?;
        Ok(inner)
    }

    fn field(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.event(Event::Start(BytesStart::new(name)))?;
        self.event(Event::Text(BytesText::new(value)))?;
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn event(&mut self, event: Event<'_>) -> io::Result<()> {
        self.writer.write_event(event).map_err(io::Error::other)
    }
}

/// Writes a record file atomically.
///
/// Records go to a temporary file in the target's directory. The target
/// is only replaced by [`XmlFileWriter::commit`]; dropping the writer
/// without committing removes the temporary file and leaves any existing
/// target untouched.
pub struct XmlFileWriter {
    path: PathBuf,
    writer: RecordWriter<BufWriter<NamedTempFile>>,
}

impl XmlFileWriter {
    /// Starts writing `path`.
    pub fn create(path: &Path) -> XmlResult<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir).map_err(|e| XmlError::write(path, e))?;
        let writer =
            RecordWriter::new(BufWriter::new(temp)).map_err(|e| XmlError::write(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Appends one record.
    pub fn write_record(&mut self, record: &Record) -> XmlResult<()> {
        self.writer
            .write_record(record)
            .map_err(|e| XmlError::write(&self.path, e))
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.writer.written()
    }

    /// Finishes the document and moves it into place.
    ///
    /// Returns the number of records written.
    pub fn commit(self) -> XmlResult<usize> {
        let Self { path, writer } = self;
        let written = writer.written();

        let buffered = writer.finish().map_err(|e| XmlError::write(&path, e))?;
        let temp = buffered
            .into_inner()
            .map_err(|e| XmlError::write(&path, e.into_error()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| XmlError::write(&path, e))?;
        temp.persist(&path)
            .map_err(|e| XmlError::write(&path, e.error))?;

        tracing::debug!(path = %path.display(), records = written, "record file written");
        Ok(written)
    }
}

/// Writes `records` to `path` atomically, returning the count written.
pub fn write_records<'a, I>(path: &Path, records: I) -> XmlResult<usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = XmlFileWriter::create(path)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.commit()
}
