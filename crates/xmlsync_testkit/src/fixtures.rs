//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and XML files.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xmlsync_db::{Database, DatabaseConfig, DbResult, TableSchema};
use xmlsync_record::{DbRecord, Record};

/// Message raised by injected failures.
pub const INJECTED_FAILURE: &str = "injected failure";

/// A table row with explicit NULLs, for seeding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// `dep_code` column.
    pub dep_code: Option<String>,
    /// `dep_job` column.
    pub dep_job: Option<String>,
    /// `description` column.
    pub description: Option<String>,
}

impl RawRow {
    /// Creates a row from optional column values.
    pub fn new(dep_code: Option<&str>, dep_job: Option<&str>, description: Option<&str>) -> Self {
        Self {
            dep_code: dep_code.map(str::to_string),
            dep_job: dep_job.map(str::to_string),
            description: description.map(str::to_string),
        }
    }

    /// The record this row reads back as.
    pub fn to_record(&self) -> Record {
        Record::from_nullable(
            self.dep_code.clone(),
            self.dep_job.clone(),
            self.description.clone(),
        )
    }
}

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    path: Option<PathBuf>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database with the default table.
    pub fn memory() -> Self {
        Self {
            db: Database::open_in_memory(TableSchema::default())
                .expect("Failed to open in-memory database"),
            path: None,
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test database with the default table.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("xmlsync.db");
        let config = DatabaseConfig::new(path.display().to_string()).create_if_missing(true);
        let db = Database::open(&config).expect("Failed to open file database");

        Self {
            db,
            path: Some(path),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Creates an in-memory database holding `records`, inserted in order.
    pub fn seeded(records: &[Record]) -> Self {
        let mut test_db = Self::memory();
        test_db.insert_records(records);
        test_db
    }

    /// Returns the database file if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Configuration that reopens this database; None if in-memory.
    pub fn config(&self) -> Option<DatabaseConfig> {
        self.path
            .as_ref()
            .map(|p| DatabaseConfig::new(p.display().to_string()))
    }

    /// Inserts `records` in one committed transaction.
    pub fn insert_records(&mut self, records: &[Record]) {
        self.db
            .transaction(|txn| -> DbResult<()> {
                for record in records {
                    txn.insert(record)?;
                }
                Ok(())
            })
            .expect("Failed to seed database");
    }

    /// Inserts rows with explicit NULLs, bypassing the adapter.
    pub fn insert_raw(&self, rows: &[RawRow]) {
        let sql = format!(
            "INSERT INTO {} (dep_code, dep_job, description) VALUES (?1, ?2, ?3)",
            self.db.schema().table()
        );
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&sql).expect("Failed to prepare insert");
        for row in rows {
            stmt.execute((&row.dep_code, &row.dep_job, &row.description))
                .expect("Failed to insert raw row");
        }
    }

    /// All rows in identifier order.
    pub fn rows(&self) -> Vec<DbRecord> {
        let mut rows = Vec::new();
        self.db
            .for_each_row(|row| -> DbResult<()> {
                rows.push(row);
                Ok(())
            })
            .expect("Failed to scan table");
        rows.sort_by_key(|row| row.id);
        rows
    }

    /// All rows as records, sorted by key.
    pub fn records(&self) -> Vec<Record> {
        let mut records: Vec<Record> = self.rows().into_iter().map(Record::from).collect();
        records.sort_by(|a, b| a.key.cmp(&b.key).then(a.description.cmp(&b.description)));
        records
    }

    /// Raw column values in identifier order, NULLs included.
    pub fn raw_rows(&self) -> Vec<(i64, RawRow)> {
        let sql = format!(
            "SELECT id, dep_code, dep_job, description FROM {} ORDER BY id",
            self.db.schema().table()
        );
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&sql).expect("Failed to prepare select");
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    RawRow {
                        dep_code: row.get(1)?,
                        dep_job: row.get(2)?,
                        description: row.get(3)?,
                    },
                ))
            })
            .expect("Failed to query table");
        rows.collect::<Result<_, _>>().expect("Failed to read row")
    }

    /// Makes the `nth` mutation (1-based) of any later transaction fail.
    ///
    /// Inserts, updates and deletes on the table are counted together.
    /// The counter lives in the database, so a rolled-back transaction
    /// also rolls the count back.
    pub fn fail_on_mutation(&self, nth: u64) {
        let table = self.db.schema().table();
        let mut sql = String::from(
            "CREATE TABLE IF NOT EXISTS mutation_counter (n INTEGER NOT NULL);
             DELETE FROM mutation_counter;
             INSERT INTO mutation_counter (n) VALUES (0);",
        );
        for event in ["INSERT", "UPDATE", "DELETE"] {
            sql.push_str(&format!(
                "CREATE TRIGGER fail_{event} BEFORE {event} ON {table}
                 BEGIN
                     UPDATE mutation_counter SET n = n + 1;
                     SELECT RAISE(ABORT, '{INJECTED_FAILURE}')
                     WHERE (SELECT n FROM mutation_counter) >= {nth};
                 END;"
            ));
        }
        self.db
            .connection()
            .execute_batch(&sql)
            .expect("Failed to install failure triggers");
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

impl std::ops::DerefMut for TestDatabase {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.db
    }
}

/// A temporary directory for XML files.
pub struct XmlFixture {
    dir: TempDir,
}

impl XmlFixture {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Path of `name` inside the directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `records` as a record file.
    pub fn write(&self, name: &str, records: &[Record]) -> PathBuf {
        let path = self.path(name);
        xmlsync_xml::write_records(&path, records).expect("Failed to write record file");
        path
    }

    /// Writes `text` verbatim.
    pub fn write_raw(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, text).expect("Failed to write file");
        path
    }
}

impl Default for XmlFixture {
    fn default() -> Self {
        Self::new()
    }
}
