//! Explicit table transaction.

use crate::error::{DbError, DbResult, Operation};
use crate::schema::TableSchema;
use rusqlite::{params, Connection, Row, Statement};
use xmlsync_record::{DbRecord, Record, RowId};

/// What to do with a row visited by [`TableTransaction::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Leave the row as it is.
    Keep,
    /// Replace the row's description.
    Update(String),
    /// Delete the row.
    Delete,
}

/// Mutations issued so far in a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    /// Rows updated.
    pub updated: u64,
    /// Rows deleted.
    pub deleted: u64,
    /// Rows inserted.
    pub inserted: u64,
}

impl MutationStats {
    /// Total number of mutations.
    pub fn total(&self) -> u64 {
        self.updated + self.deleted + self.inserted
    }
}

/// An open transaction on the reconciled table.
///
/// Holds exactly one prepared statement per mutation kind, created when
/// the transaction begins and finalized when it ends. Obtained through
/// [`crate::Database::transaction`] or [`crate::Database::dry_run`].
pub struct TableTransaction<'a> {
    conn: &'a Connection,
    schema: &'a TableSchema,
    insert: Statement<'a>,
    update: Statement<'a>,
    delete: Statement<'a>,
    stats: MutationStats,
}

impl<'a> TableTransaction<'a> {
    pub(crate) fn prepare(conn: &'a Connection, schema: &'a TableSchema) -> DbResult<Self> {
        let prepare = move |sql: String, operation: Operation| {
            conn.prepare(&sql).map_err(DbError::during(operation))
        };
        Ok(Self {
            conn,
            schema,
            insert: prepare(schema.insert_sql(), Operation::Insert)?,
            update: prepare(schema.update_sql(), Operation::Update)?,
            delete: prepare(schema.delete_sql(), Operation::Delete)?,
            stats: MutationStats::default(),
        })
    }

    /// Mutations issued so far.
    pub fn stats(&self) -> MutationStats {
        self.stats
    }

    /// Streams every row through `classify` and applies the returned action
    /// while the cursor is still open.
    ///
    /// Returns the number of rows visited.
    pub fn scan<F>(&mut self, mut classify: F) -> DbResult<usize>
    where
        F: FnMut(&DbRecord) -> RowAction,
    {
        let conn = self.conn;
        let mut select = conn
            .prepare(&self.schema.select_sql())
            .map_err(DbError::during(Operation::Scan))?;
        let mut rows = select
            .query([])
            .map_err(DbError::during(Operation::Scan))?;

        let mut visited = 0;
        while let Some(row) = rows.next().map_err(DbError::during(Operation::Scan))? {
            let record = read_row(row)?;
            visited += 1;
            match classify(&record) {
                RowAction::Keep => {}
                RowAction::Update(description) => self.update(record.id, &description)?,
                RowAction::Delete => self.delete(record.id)?,
            }
        }
        Ok(visited)
    }

    /// Inserts a new row.
    pub fn insert(&mut self, record: &Record) -> DbResult<()> {
        self.insert
            .execute(params![
                nullable(record.dep_code()),
                nullable(record.dep_job()),
                nullable(&record.description),
            ])
            .map_err(DbError::during(Operation::Insert))?;
        self.stats.inserted += 1;
        tracing::debug!(key = %record.key, "inserted row");
        Ok(())
    }

    /// Replaces the description of row `id`.
    pub fn update(&mut self, id: RowId, description: &str) -> DbResult<()> {
        self.update
            .execute(params![nullable(description), id.as_i64()])
            .map_err(DbError::during(Operation::Update))?;
        self.stats.updated += 1;
        tracing::debug!(%id, "updated row");
        Ok(())
    }

    /// Deletes row `id`.
    pub fn delete(&mut self, id: RowId) -> DbResult<()> {
        self.delete
            .execute(params![id.as_i64()])
            .map_err(DbError::during(Operation::Delete))?;
        self.stats.deleted += 1;
        tracing::debug!(%id, "deleted row");
        Ok(())
    }
}

/// Maps the empty string to SQL `NULL`.
fn nullable(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Reads a row produced by [`TableSchema::select_sql`].
pub(crate) fn read_row(row: &Row<'_>) -> DbResult<DbRecord> {
    let read = || -> rusqlite::Result<DbRecord> {
        Ok(DbRecord::new(
            RowId::new(row.get(0)?),
            Record::from_nullable(row.get(1)?, row.get(2)?, row.get(3)?),
        ))
    };
    read().map_err(DbError::during(Operation::Scan))
}
