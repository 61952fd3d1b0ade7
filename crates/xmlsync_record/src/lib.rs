//! # XmlSync Record
//!
//! Record model shared by the XML adapter, the database adapter and the
//! sync engine.
//!
//! This crate provides:
//! - [`RecordKey`] - the `(depCode, depJob)` natural key
//! - [`Record`] - a key plus its description
//! - [`DbRecord`] - a record read from the table, with its row id
//! - [`RecordSet`] - a key-unique collection of records loaded from XML
//!
//! ## Normalization
//!
//! Absent values (SQL `NULL`, missing text) are normalized to the empty
//! string when a key or record is built. Comparison, hashing and storage
//! only ever see normalized strings, so a `NULL` description in the table
//! and an empty `<description/>` element in a file are the same value.
//!
//! ```
//! use xmlsync_record::RecordKey;
//!
//! let from_db = RecordKey::from_nullable(Some("10".into()), None);
//! let from_xml = RecordKey::new("10", "");
//! assert_eq!(from_db, from_xml);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod key;
mod record;
mod set;

pub use key::{normalize, RecordKey};
pub use record::{DbRecord, Record, RowId};
pub use set::{DuplicateKey, RecordSet};
