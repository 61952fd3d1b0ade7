//! # XmlSync Testkit
//!
//! Test utilities for XmlSync.
//!
//! This crate provides:
//! - Database fixtures with seeding, row inspection and failure injection
//! - Temporary XML files
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xmlsync_testkit::prelude::*;
//!
//! #[test]
//! fn sync_replaces_rows() {
//!     let db = TestDatabase::seeded(&[Record::new("10", "ENG", "Engineer")]);
//!     let xml = XmlFixture::new();
//!     let path = xml.write("deps.xml", &[]);
//!     // ... run a sync against db and path
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use xmlsync_record::{DbRecord, Record, RecordKey, RowId};
}

pub use fixtures::*;
pub use generators::*;
