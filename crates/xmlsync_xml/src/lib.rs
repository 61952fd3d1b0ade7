//! # XmlSync XML
//!
//! Reader and writer for the XML record file.
//!
//! ## Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <records>
//!     <record>
//!         <depCode>10</depCode>
//!         <depJob>ENG</depJob>
//!         <description>Engineer</description>
//!     </record>
//! </records>
//! ```
//!
//! Every `record` carries exactly the three children above, in that
//! order on output. Empty or absent values are written as empty
//! elements. Output is indented with four spaces.
//!
//! ## Guarantees
//!
//! - [`read_records`] rejects two records with the same normalized key
//! - [`XmlFileWriter`] writes to a temporary file next to the target and
//!   renames it into place on [`XmlFileWriter::commit`], so a failed
//!   export never leaves a truncated file behind

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod reader;
mod writer;

pub use error::{XmlError, XmlResult};
pub use reader::{read_records, read_records_from_str, RecordReader};
pub use writer::{write_records, RecordWriter, XmlFileWriter};

/// Name of the root element.
pub const ROOT_ELEMENT: &str = "records";
/// Name of the per-record element.
pub const RECORD_ELEMENT: &str = "record";
/// Name of the department code element.
pub const DEP_CODE: &str = "depCode";
/// Name of the department job element.
pub const DEP_JOB: &str = "depJob";
/// Name of the description element.
pub const DESCRIPTION: &str = "description";

/// Indentation width of written files.
pub const INDENT: usize = 4;
