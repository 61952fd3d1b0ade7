//! Streaming record file reader.

use crate::error::{XmlError, XmlResult};
use crate::{DEP_CODE, DEP_JOB, DESCRIPTION, RECORD_ELEMENT, ROOT_ELEMENT};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use xmlsync_record::{Record, RecordSet};

/// Reads a record file into a key-unique set.
///
/// # Errors
///
/// - [`XmlError::Read`] if the file cannot be opened or read
/// - [`XmlError::Parse`] if it is malformed or not a record file
/// - [`XmlError::DuplicateKey`] if two records normalize to the same key
pub fn read_records(path: &Path) -> XmlResult<RecordSet> {
    let file = File::open(path).map_err(|source| XmlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let set = RecordReader::new(BufReader::new(file), path).read_set()?;
    tracing::debug!(path = %path.display(), records = set.len(), "loaded record file");
    Ok(set)
}

/// Parses records held in memory.
pub fn read_records_from_str(xml: &str) -> XmlResult<RecordSet> {
    RecordReader::new(xml.as_bytes(), Path::new("<memory>")).read_set()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    DepCode,
    DepJob,
    Description,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        [Field::DepCode, Field::DepJob, Field::Description]
            .into_iter()
            .find(|f| f.name().as_bytes() == name)
    }

    fn name(self) -> &'static str {
        match self {
            Field::DepCode => DEP_CODE,
            Field::DepJob => DEP_JOB,
            Field::Description => DESCRIPTION,
        }
    }

    fn index(self) -> usize {
        match self {
            Field::DepCode => 0,
            Field::DepJob => 1,
            Field::Description => 2,
        }
    }
}

/// Values collected for the record being parsed.
#[derive(Default)]
struct PendingRecord {
    fields: [Option<String>; 3],
}

impl PendingRecord {
    fn set(&mut self, field: Field, value: String) -> Result<(), String> {
        let slot = &mut self.fields[field.index()];
        if slot.is_some() {
            return Err(format!("repeated <{}> element", field.name()));
        }
        *slot = Some(value);
        Ok(())
    }

    fn finish(self) -> Result<Record, String> {
        let [dep_code, dep_job, description] = self.fields;
        let missing = |name: &str| format!("missing <{name}> element");
        Ok(Record::new(
            dep_code.ok_or_else(|| missing(DEP_CODE))?,
            dep_job.ok_or_else(|| missing(DEP_JOB))?,
            description.ok_or_else(|| missing(DESCRIPTION))?,
        ))
    }
}

/// Pull parser turning a record file into a [`RecordSet`].
///
/// Field text is kept verbatim, including surrounding whitespace.
/// Whitespace between elements is ignored; any other stray text is an
/// error.
pub struct RecordReader<R: BufRead> {
    reader: Reader<R>,
    path: PathBuf,
}

impl<R: BufRead> RecordReader<R> {
    /// Creates a reader; `path` is only used to label errors.
    pub fn new(inner: R, path: &Path) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            path: path.to_path_buf(),
        }
    }

    fn error(&self, message: impl Into<String>) -> XmlError {
        XmlError::parse(
            &self.path,
            format!(
                "{} (at byte {})",
                message.into(),
                self.reader.buffer_position()
            ),
        )
    }

    /// Parses the whole document.
    pub fn read_set(mut self) -> XmlResult<RecordSet> {
        let mut set = RecordSet::new();
        let mut buf = Vec::new();

        let mut depth = 0usize;
        let mut root_seen = false;
        let mut record_index = 0usize;
        let mut pending: Option<PendingRecord> = None;
        let mut field: Option<(Field, String)> = None;

        loop {
            let event = match self.reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => return Err(self.error(e.to_string())),
            };

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    match depth {
                        0 => {
                            self.expect_name(e, ROOT_ELEMENT, root_seen)?;
                            root_seen = true;
                        }
                        1 => {
                            self.expect_name(e, RECORD_ELEMENT, false)?;
                            record_index += 1;
                            pending = Some(PendingRecord::default());
                        }
                        2 => {
                            let Some(f) = Field::from_name(e.name().as_ref()) else {
                                return Err(self.error(format!(
                                    "record #{record_index}: unexpected element <{}>",
                                    element_name(e)
                                )));
                            };
                            field = Some((f, String::new()));
                        }
                        _ => {
                            return Err(self.error(format!(
                                "record #{record_index}: unexpected nested element <{}>",
                                element_name(e)
                            )));
                        }
                    }

                    if is_empty {
                        self.close(
                            depth,
                            &mut pending,
                            &mut field,
                            &mut set,
                            record_index,
                        )?;
                    } else {
                        depth += 1;
                    }
                }
                Event::End(_) => {
                    let Some(closed) = depth.checked_sub(1) else {
                        return Err(self.error("unmatched closing tag"));
                    };
                    depth = closed;
                    self.close(depth, &mut pending, &mut field, &mut set, record_index)?;
                }
                Event::Text(ref e) => {
                    let text = match e.unescape() {
                        Ok(text) => text,
                        Err(err) => {
                            return Err(self.error(format!("record #{record_index}: {err}")))
                        }
                    };
                    match field.as_mut() {
                        Some((_, value)) => value.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => return Err(self.error("unexpected text outside a field")),
                    }
                }
                Event::CData(e) => {
                    let text = match String::from_utf8(e.into_inner().into_owned()) {
                        Ok(text) => text,
                        Err(err) => {
                            return Err(self.error(format!(
                                "record #{record_index}: CDATA is not valid UTF-8: {err}"
                            )))
                        }
                    };
                    match field.as_mut() {
                        Some((_, value)) => value.push_str(&text),
                        None => return Err(self.error("unexpected CDATA outside a field")),
                    }
                }
                Event::Decl(ref decl) => {
                    if let Some(Ok(encoding)) = decl.encoding() {
                        let encoding = String::from_utf8_lossy(&encoding).into_owned();
                        if !is_utf8_label(&encoding) {
                            return Err(self.error(format!(
                                "unsupported encoding {encoding:?}, only UTF-8 is read"
                            )));
                        }
                    }
                }
                Event::Eof => {
                    if depth != 0 || pending.is_some() || field.is_some() {
                        return Err(self.error(format!(
                            "unexpected end of document ({depth} element(s) left open)"
                        )));
                    }
                    break;
                }
                // Comments, processing instructions, doctype
                _ => {}
            }
            buf.clear();
        }

        if !root_seen {
            return Err(self.error(format!("missing <{ROOT_ELEMENT}> root element")));
        }
        Ok(set)
    }

    fn expect_name(&self, e: &BytesStart<'_>, expected: &str, repeated: bool) -> XmlResult<()> {
        if repeated {
            return Err(self.error("more than one root element"));
        }
        if e.name().as_ref() != expected.as_bytes() {
            return Err(self.error(format!(
                "expected <{expected}>, found <{}>",
                element_name(e)
            )));
        }
        Ok(())
    }

    /// Handles the end of an element opened at `depth`.
    fn close(
        &self,
        depth: usize,
        pending: &mut Option<PendingRecord>,
        field: &mut Option<(Field, String)>,
        set: &mut RecordSet,
        record_index: usize,
    ) -> XmlResult<()> {
        match depth {
            2 => {
                if let (Some((f, value)), Some(record)) = (field.take(), pending.as_mut()) {
                    record
                        .set(f, value)
                        .map_err(|msg| self.error(format!("record #{record_index}: {msg}")))?;
                }
            }
            1 => {
                if let Some(record) = pending.take() {
                    let record = record
                        .finish()
                        .map_err(|msg| self.error(format!("record #{record_index}: {msg}")))?;
                    set.insert_unique(record)
                        .map_err(|dup| XmlError::DuplicateKey {
                            path: self.path.clone(),
                            key: dup.key,
                        })?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn is_utf8_label(encoding: &str) -> bool {
    encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8")
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlsync_record::RecordKey;

    fn doc(body: &str) -> String {
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<records>{body}</records>")
    }

    #[test]
    fn reads_records() {
        let xml = doc(
            "<record><depCode>10</depCode><depJob>ENG</depJob><description>Engineer</description></record>
             <record><depCode>20</depCode><depJob>OPS</depJob><description>Operator</description></record>",
        );
        let set = read_records_from_str(&xml).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&RecordKey::new("10", "ENG")), Some("Engineer"));
        assert_eq!(set.get(&RecordKey::new("20", "OPS")), Some("Operator"));
    }

    #[test]
    fn empty_root_is_an_empty_set() {
        assert!(read_records_from_str("<records/>").unwrap().is_empty());
        assert!(read_records_from_str(&doc("\n")).unwrap().is_empty());
    }

    #[test]
    fn empty_elements_read_as_empty_strings() {
        let xml = doc("<record><depCode/><depJob></depJob><description/></record>");
        let set = read_records_from_str(&xml).unwrap();
        assert_eq!(set.get(&RecordKey::new("", "")), Some(""));
    }

    #[test]
    fn field_text_is_kept_verbatim() {
        let xml = doc(
            "<record><depCode> 10 </depCode><depJob>R&amp;D</depJob><description><![CDATA[<b>]]></description></record>",
        );
        let set = read_records_from_str(&xml).unwrap();
        assert_eq!(set.get(&RecordKey::new(" 10 ", "R&D")), Some("<b>"));
    }

    #[test]
    fn duplicate_key_is_reported() {
        let xml = doc(
            "<record><depCode>A</depCode><depJob>B</depJob><description>1</description></record>
             <record><depCode>A</depCode><depJob>B</depJob><description>2</description></record>",
        );
        match read_records_from_str(&xml) {
            Err(XmlError::DuplicateKey { key, .. }) => assert_eq!(key, RecordKey::new("A", "B")),
            other => panic!("expected duplicate key, got {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let xml = doc("<record><depCode>A</depCode><description>x</description></record>");
        let err = read_records_from_str(&xml).unwrap_err();
        assert!(matches!(err, XmlError::Parse { .. }));
        assert!(err.to_string().contains("depJob"));
    }

    #[test]
    fn repeated_field_is_a_parse_error() {
        let xml = doc(
            "<record><depCode>A</depCode><depCode>B</depCode><depJob/><description/></record>",
        );
        assert!(matches!(
            read_records_from_str(&xml),
            Err(XmlError::Parse { .. })
        ));
    }

    #[test]
    fn wrong_root_is_a_parse_error() {
        let err = read_records_from_str("<deps></deps>").unwrap_err();
        assert!(err.to_string().contains("expected <records>"));
    }

    #[test]
    fn unknown_element_is_a_parse_error() {
        let xml = doc("<record><depCode/><depJob/><description/><extra/></record>");
        assert!(read_records_from_str(&xml).is_err());
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let xml = "<records><record><depCode>A</depJob></record></records>";
        assert!(matches!(
            read_records_from_str(xml),
            Err(XmlError::Parse { .. })
        ));
        assert!(matches!(
            read_records_from_str(""),
            Err(XmlError::Parse { .. })
        ));
    }

    #[test]
    fn unclosed_root_is_a_parse_error() {
        let xml = "<records><record><depCode>A</depCode><depJob>B</depJob><description>x</description></record>";
        let err = read_records_from_str(xml).unwrap_err();
        assert!(matches!(err, XmlError::Parse { .. }));
        assert!(err.to_string().contains("unexpected end of document"));
    }

    #[test]
    fn record_cut_off_mid_way_is_a_parse_error() {
        let xml = "<records><record><depCode>A</depCode><depJob>B</depJob>";
        assert!(matches!(
            read_records_from_str(xml),
            Err(XmlError::Parse { .. })
        ));

        let xml = "<records><record><depCode>A</depCode><depJob>B";
        assert!(matches!(
            read_records_from_str(xml),
            Err(XmlError::Parse { .. })
        ));
    }

    #[test]
    fn declared_encoding_other_than_utf8_is_named() {
        let xml = "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><records/>";
        let err = read_records_from_str(xml).unwrap_err();
        assert!(matches!(err, XmlError::Parse { .. }));
        assert!(err.to_string().contains("ISO-8859-1"));

        let xml = "<?xml version=\"1.0\" encoding=\"utf-8\"?><records/>";
        assert!(read_records_from_str(xml).unwrap().is_empty());
    }

    #[test]
    fn invalid_utf8_cdata_is_a_parse_error() {
        let mut xml = b"<records><record><depCode><![CDATA[".to_vec();
        xml.extend_from_slice(&[0xff, 0xfe]);
        xml.extend_from_slice(b"]]></depCode><depJob/><description/></record></records>");
        let err = RecordReader::new(xml.as_slice(), Path::new("latin.xml"))
            .read_set()
            .unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn stray_text_is_a_parse_error() {
        assert!(read_records_from_str(&doc("hello")).is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = read_records(Path::new("/nonexistent/xmlsync/records.xml")).unwrap_err();
        assert!(matches!(err, XmlError::Read { .. }));
    }
}
