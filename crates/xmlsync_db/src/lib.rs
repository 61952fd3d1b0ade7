//! # XmlSync DB
//!
//! Adapter over the single SQLite table that XmlSync reconciles.
//!
//! This crate provides:
//! - [`Database`] - connection bootstrap, schema checks, read-only cursor
//! - [`TableTransaction`] - explicit transaction with insert/update/delete
//! - [`TableSchema`] - validated table name and the SQL built from it
//!
//! ## NULL handling
//!
//! The record model never sees `NULL`: reads normalize it to `""`.
//! Writes do the reverse, storing an empty string as `NULL` and any other
//! string verbatim. This conversion happens here and nowhere else.
//!
//! ## Transactions
//!
//! [`Database::transaction`] begins a transaction, prepares one statement
//! per mutation kind, runs the caller's closure and commits on `Ok`. An
//! `Err` from the closure, or a failed commit, rolls everything back.
//! Statements, cursors and the transaction itself are released on every
//! path by `Drop`, and the connection returns to autocommit mode.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod schema;
mod transaction;

pub use rusqlite;

pub use config::DatabaseConfig;
pub use database::Database;
pub use error::{DbError, DbResult, Operation};
pub use schema::{TableSchema, DEFAULT_TABLE};
pub use transaction::{MutationStats, RowAction, TableTransaction};
