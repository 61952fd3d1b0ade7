//! Connection and cursor access.

use crate::config::DatabaseConfig;
use crate::error::{DbError, DbResult, Operation};
use crate::schema::TableSchema;
use crate::transaction::{read_row, TableTransaction};
use rusqlite::{Connection, OpenFlags};
use xmlsync_record::DbRecord;

/// An open connection to the database holding the reconciled table.
///
/// A `Database` is owned by exactly one engine for the duration of an
/// export or sync call.
pub struct Database {
    conn: Connection,
    schema: TableSchema,
}

impl Database {
    /// Opens the database described by `config`.
    ///
    /// Unless `create_if_missing` is set, the database file and table must
    /// already exist.
    pub fn open(config: &DatabaseConfig) -> DbResult<Self> {
        let schema = TableSchema::new(config.table.clone())?;

        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if config.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        let connection_error = |source: rusqlite::Error| DbError::Connection {
            url: config.url.clone(),
            source,
        };
        let conn = Connection::open_with_flags(&config.url, flags).map_err(connection_error)?;
        conn.busy_timeout(config.busy_timeout())
            .map_err(connection_error)?;

        tracing::info!(url = %config.url, table = schema.table(), "connected to database");
        let db = Self { conn, schema };
        db.ensure_table(config.create_if_missing)?;
        Ok(db)
    }

    /// Opens a private in-memory database with an empty table.
    pub fn open_in_memory(schema: TableSchema) -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DbError::Connection {
            url: ":memory:".to_string(),
            source,
        })?;
        let db = Self { conn, schema };
        db.create_table()?;
        Ok(db)
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns true if the table exists.
    pub fn table_exists(&self) -> DbResult<bool> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [self.schema.table()],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)
            .map_err(DbError::during(Operation::Schema))
    }

    /// Creates the table if it does not exist.
    pub fn create_table(&self) -> DbResult<()> {
        self.conn
            .execute_batch(&self.schema.create_sql())
            .map_err(DbError::during(Operation::Schema))
    }

    fn ensure_table(&self, create_if_missing: bool) -> DbResult<()> {
        if self.table_exists()? {
            return Ok(());
        }
        if create_if_missing {
            tracing::info!(table = self.schema.table(), "creating table");
            return self.create_table();
        }
        Err(DbError::MissingTable {
            table: self.schema.table().to_string(),
        })
    }

    /// Streams every row through `visit`, in identifier order.
    ///
    /// Rows are read one at a time; the table is never loaded as a whole.
    /// Returns the number of rows visited.
    pub fn for_each_row<F, E>(&self, mut visit: F) -> Result<usize, E>
    where
        F: FnMut(DbRecord) -> Result<(), E>,
        E: From<DbError>,
    {
        let mut select = self
            .conn
            .prepare(&self.schema.select_sql())
            .map_err(DbError::during(Operation::Scan))?;
        let mut rows = select
            .query([])
            .map_err(DbError::during(Operation::Scan))?;

        let mut count = 0;
        while let Some(row) = rows.next().map_err(DbError::during(Operation::Scan))? {
            visit(read_row(row)?)?;
            count += 1;
        }
        Ok(count)
    }

    /// Runs `f` inside a transaction and commits if it returns `Ok`.
    ///
    /// If `f` fails, the transaction is rolled back and the error is
    /// returned unchanged. A failed commit is rolled back as well.
    pub fn transaction<F, T, E>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TableTransaction<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        self.run_transaction(true, f)
    }

    /// Runs `f` inside a transaction that is always rolled back.
    pub fn dry_run<F, T, E>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TableTransaction<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        self.run_transaction(false, f)
    }

    fn run_transaction<F, T, E>(&mut self, commit: bool, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TableTransaction<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        let tx = self
            .conn
            .transaction()
            .map_err(DbError::during(Operation::Begin))?;
        tracing::debug!(table = self.schema.table(), "transaction started");

        let outcome = {
            let mut txn = TableTransaction::prepare(&tx, &self.schema)?;
            let outcome = f(&mut txn);
            if outcome.is_ok() {
                let stats = txn.stats();
                tracing::debug!(
                    mutations = stats.total(),
                    updated = stats.updated,
                    deleted = stats.deleted,
                    inserted = stats.inserted,
                    "transaction body finished"
                );
            }
            outcome
        };

        match outcome {
            Ok(value) if commit => {
                tx.commit().map_err(DbError::during(Operation::Commit))?;
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Ok(value) => {
                tx.rollback().map_err(DbError::during(Operation::Rollback))?;
                tracing::debug!("dry run rolled back");
                Ok(value)
            }
            Err(err) => {
                // The original error wins over a failed rollback
                if let Err(rollback) = tx.rollback() {
                    tracing::error!(error = %rollback, "rollback failed");
                } else {
                    tracing::warn!("transaction rolled back");
                }
                Err(err)
            }
        }
    }
}
