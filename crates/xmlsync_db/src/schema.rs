//! Table layout and SQL text.

use crate::error::{DbError, DbResult};

/// Table used when the configuration does not name one.
pub const DEFAULT_TABLE: &str = "dep_codes";

/// Surrogate key column.
pub const ID: &str = "id";
/// Department code column.
pub const DEP_CODE: &str = "dep_code";
/// Department job column.
pub const DEP_JOB: &str = "dep_job";
/// Description column.
pub const DESCRIPTION: &str = "description";

/// The reconciled table.
///
/// Table names cannot be bound as statement parameters, so the name is
/// restricted to `[A-Za-z_][A-Za-z0-9_]*` before it is spliced into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table: String,
}

impl TableSchema {
    /// Creates a schema for `table`.
    pub fn new(table: impl Into<String>) -> DbResult<Self> {
        let table = table.into();
        let mut chars = table.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(DbError::InvalidTableName(table));
        }
        Ok(Self { table })
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub(crate) fn create_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                {ID} INTEGER PRIMARY KEY AUTOINCREMENT,
                {DEP_CODE} TEXT,
                {DEP_JOB} TEXT,
                {DESCRIPTION} TEXT
            )",
            self.table
        )
    }

    pub(crate) fn select_sql(&self) -> String {
        format!(
            "SELECT {ID}, {DEP_CODE}, {DEP_JOB}, {DESCRIPTION} FROM {} ORDER BY {ID}",
            self.table
        )
    }

    pub(crate) fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({DEP_CODE}, {DEP_JOB}, {DESCRIPTION}) VALUES (?1, ?2, ?3)",
            self.table
        )
    }

    pub(crate) fn update_sql(&self) -> String {
        format!(
            "UPDATE {} SET {DESCRIPTION} = ?1 WHERE {ID} = ?2",
            self.table
        )
    }

    pub(crate) fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE {ID} = ?1", self.table)
    }
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
        }
    }
}
