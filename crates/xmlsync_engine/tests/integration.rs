//! End-to-end tests for export and sync.

use proptest::prelude::*;
use std::path::Path;
use xmlsync_engine::{
    AppConfig, BufferProgress, ErrorKind, NoProgress, ProgressSink, SyncEngine, SyncOptions,
    SyncPhase,
};
use xmlsync_testkit::prelude::*;

/// Opens a second connection to a file database, leaving the fixture free
/// to inspect the table while the engine holds its own.
fn connect<P: ProgressSink>(db: &TestDatabase, progress: P) -> SyncEngine<P> {
    let config = db.config().expect("file database");
    SyncEngine::connect(&AppConfig::new(config), Path::new("xmlsync.toml"), progress).unwrap()
}

fn engine(db: TestDatabase) -> (SyncEngine<NoProgress>, TestDatabase) {
    (connect(&db, NoProgress), db)
}

fn file_db(records: &[Record]) -> TestDatabase {
    let mut db = TestDatabase::file();
    db.insert_records(records);
    db
}

fn ids(db: &TestDatabase) -> Vec<(i64, Record)> {
    db.rows()
        .into_iter()
        .map(|row| (row.id.as_i64(), row.record))
        .collect()
}

#[test]
fn update_and_insert_scenario() {
    let db = file_db(&[Record::new("10", "ENG", "Engineer")]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();
    let path = xml.write(
        "deps.xml",
        &[
            Record::new("10", "ENG", "Senior Engineer"),
            Record::new("20", "OPS", "Operator"),
        ],
    );

    let report = engine.sync_with_file(&path).unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.inserted, 1);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.unchanged, 0);

    let rows = ids(&db);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], (1, Record::new("10", "ENG", "Senior Engineer")));
    assert_eq!(rows[1].1, Record::new("20", "OPS", "Operator"));
}

#[test]
fn second_sync_is_a_no_op() {
    let db = file_db(&[
        Record::new("10", "ENG", "Engineer"),
        Record::new("30", "HR", "Recruiter"),
    ]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();
    let path = xml.write(
        "deps.xml",
        &[
            Record::new("10", "ENG", "Engineer"),
            Record::new("20", "OPS", "Operator"),
        ],
    );

    let first = engine.sync_with_file(&path).unwrap();
    assert_eq!(first.mutations(), 2);
    let after_first = ids(&db);

    let second = engine.sync_with_file(&path).unwrap();
    assert_eq!(second.mutations(), 0);
    assert_eq!(second.unchanged, 2);
    assert_eq!(ids(&db), after_first);
}

#[test]
fn export_then_sync_is_a_no_op() {
    let db = file_db(&[
        Record::new("10", "ENG", "Engineer"),
        Record::new("20", "", ""),
        Record::new(" 30 ", "HR", "  padded  "),
    ]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();
    let path = xml.path("export.xml");

    let export = engine.export_to_file(&path).unwrap();
    assert_eq!(export.records, 3);

    let before = ids(&db);
    let report = engine.sync_with_file(&path).unwrap();
    assert_eq!(report.mutations(), 0);
    assert_eq!(ids(&db), before);
}

#[test]
fn duplicate_key_leaves_table_untouched() {
    let db = file_db(&[Record::new("10", "ENG", "Engineer")]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();
    let path = xml.write_raw(
        "deps.xml",
        "<records>
            <record><depCode>A</depCode><depJob>B</depJob><description>one</description></record>
            <record><depCode>A</depCode><depJob>B</depJob><description>two</description></record>
        </records>",
    );

    let before = db.raw_rows();
    let err = engine.sync_with_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    assert!(err.to_string().contains("\"A\""));
    assert!(err.to_string().contains("\"B\""));
    assert_eq!(engine.phase(), SyncPhase::Failed);
    assert_eq!(db.raw_rows(), before);
}

#[test]
fn malformed_file_leaves_table_untouched() {
    let db = file_db(&[Record::new("10", "ENG", "Engineer")]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();
    let path = xml.write_raw("deps.xml", "<records><record><depCode>");

    let before = db.raw_rows();
    let err = engine.sync_with_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(db.raw_rows(), before);
}

#[test]
fn truncated_file_leaves_table_untouched() {
    let db = file_db(&[
        Record::new("10", "ENG", "Engineer"),
        Record::new("20", "OPS", "Operator"),
    ]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();
    // Complete first record, closing root tag lost
    let path = xml.write_raw(
        "deps.xml",
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
        <records>
            <record><depCode>10</depCode><depJob>ENG</depJob><description>Engineer</description></record>",
    );

    let before = db.raw_rows();
    let err = engine.sync_with_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(engine.phase(), SyncPhase::Failed);
    assert_eq!(db.raw_rows(), before);
}

#[test]
fn missing_file_is_a_file_error() {
    let (mut engine, _db) = engine(file_db(&[]));
    let err = engine
        .sync_with_file(Path::new("/nonexistent/xmlsync/deps.xml"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileIo);
}

#[test]
fn null_description_matches_empty_element() {
    let db = TestDatabase::file();
    db.insert_raw(&[RawRow::new(Some("10"), Some("ENG"), None)]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();
    let path = xml.write_raw(
        "deps.xml",
        "<records><record><depCode>10</depCode><depJob>ENG</depJob><description/></record></records>",
    );

    let report = engine.sync_with_file(&path).unwrap();
    assert_eq!(report.mutations(), 0);
    assert_eq!(report.unchanged, 1);
    assert_eq!(db.raw_rows()[0].1.description, None);
}

#[test]
fn empty_strings_are_stored_as_null() {
    let (mut engine, db) = engine(file_db(&[]));
    let xml = XmlFixture::new();
    let path = xml.write("deps.xml", &[Record::new("", "ENG", "")]);

    engine.sync_with_file(&path).unwrap();
    assert_eq!(db.raw_rows()[0].1, RawRow::new(None, Some("ENG"), None));
}

#[test]
fn failing_mutation_rolls_everything_back() {
    let seed = [
        Record::new("10", "ENG", "Engineer"),
        Record::new("20", "OPS", "Operator"),
        Record::new("30", "HR", "Recruiter"),
    ];
    // One update, one delete, two inserts
    let target = [
        Record::new("10", "ENG", "Senior Engineer"),
        Record::new("20", "OPS", "Operator"),
        Record::new("40", "FIN", "Accountant"),
        Record::new("50", "IT", "Admin"),
    ];

    for k in 1..=4 {
        let db = file_db(&seed);
        db.fail_on_mutation(k);
        let (mut engine, db) = engine(db);
        let xml = XmlFixture::new();
        let path = xml.write("deps.xml", &target);

        let before = db.raw_rows();
        let err = engine.sync_with_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DbOperation, "mutation {k}");
        assert!(err.to_string().contains(INJECTED_FAILURE));
        assert_eq!(engine.phase(), SyncPhase::Failed);
        assert_eq!(db.raw_rows(), before, "mutation {k}");
    }
}

#[test]
fn engine_recovers_after_failure() {
    let db = file_db(&[Record::new("10", "ENG", "Engineer")]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();

    let bad = xml.write_raw("bad.xml", "<deps/>");
    assert!(engine.sync_with_file(&bad).is_err());

    let good = xml.write("good.xml", &[Record::new("20", "OPS", "Operator")]);
    engine.sync_with_file(&good).unwrap();
    assert_eq!(engine.phase(), SyncPhase::Committed);
    assert_eq!(db.records(), vec![Record::new("20", "OPS", "Operator")]);
}

#[test]
fn duplicate_rows_collapse_onto_first() {
    let db = file_db(&[
        Record::new("", "", "blank"),
        Record::new("10", "ENG", "Engineer"),
        Record::new("", "", "other"),
        Record::new("10", "ENG", "Engineer"),
    ]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();
    let path = xml.write(
        "deps.xml",
        &[
            Record::new("", "", "blank"),
            Record::new("10", "ENG", "Engineer"),
        ],
    );

    let report = engine.sync_with_file(&path).unwrap();
    assert_eq!(report.unchanged, 2);
    assert_eq!(report.deleted, 2);
    assert_eq!(report.inserted, 0);

    let rows = ids(&db);
    assert_eq!(
        rows,
        vec![
            (1, Record::new("", "", "blank")),
            (2, Record::new("10", "ENG", "Engineer")),
        ]
    );
}

#[test]
fn empty_file_empties_the_table() {
    let (mut engine, db) = engine(file_db(&[
        Record::new("10", "ENG", "Engineer"),
        Record::new("20", "OPS", "Operator"),
    ]));
    let xml = XmlFixture::new();
    let path = xml.write("deps.xml", &[]);

    let report = engine.sync_with_file(&path).unwrap();
    assert_eq!(report.deleted, 2);
    assert!(db.rows().is_empty());
}

#[test]
fn dry_run_reports_without_changing() {
    let db = file_db(&[Record::new("10", "ENG", "Engineer")]);
    let (mut engine, db) = engine(db);
    let xml = XmlFixture::new();
    let path = xml.write("deps.xml", &[Record::new("20", "OPS", "Operator")]);

    let before = db.raw_rows();
    let report = engine
        .sync_with_options(&path, SyncOptions::dry_run())
        .unwrap();
    assert_eq!((report.deleted, report.inserted), (1, 1));
    assert_eq!(report.phase, SyncPhase::RolledBack);
    assert_eq!(db.raw_rows(), before);
}

#[test]
fn sync_never_writes_the_file() {
    let (mut engine, _db) = engine(file_db(&[Record::new("10", "ENG", "Engineer")]));
    let xml = XmlFixture::new();
    let path = xml.write("deps.xml", &[Record::new("20", "OPS", "Operator")]);
    let before = std::fs::read(&path).unwrap();

    engine.sync_with_file(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn progress_lines_bracket_each_call() {
    let db = file_db(&[]);
    let progress = BufferProgress::new();
    let mut engine = connect(&db, &progress);
    let xml = XmlFixture::new();
    let path = xml.write("deps.xml", &[Record::new("10", "ENG", "Engineer")]);
    let out = xml.path("out.xml");

    engine.sync_with_file(&path).unwrap();
    engine.export_to_file(&out).unwrap();
    assert_eq!(
        progress.take(),
        vec![
            format!("Synchronizing the database with \"{}\"", path.display()),
            "Synchronization complete".to_string(),
            format!("Exporting data from the database to \"{}\"", out.display()),
            "Export complete".to_string(),
        ]
    );

    let bad = xml.write_raw("bad.xml", "<records><record/></records>");
    assert!(engine.sync_with_file(&bad).is_err());
    assert_eq!(engine.progress().lines().len(), 1);

    let db = engine.into_database();
    assert!(db.table_exists().unwrap());
}

#[test]
fn in_memory_engine_round_trip() {
    let mut engine = SyncEngine::new(TestDatabase::memory().db, NoProgress);
    let xml = XmlFixture::new();
    let path = xml.write(
        "deps.xml",
        &[
            Record::new("10", "ENG", "Engineer"),
            Record::new("", "", ""),
        ],
    );

    let report = engine.sync_with_file(&path).unwrap();
    assert_eq!(report.inserted, 2);

    let out = xml.path("out.xml");
    assert_eq!(engine.export_to_file(&out).unwrap().records, 2);
    assert_eq!(engine.sync_with_file(&out).unwrap().mutations(), 0);
}

fn sorted(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by(|a, b| a.key.cmp(&b.key).then(a.description.cmp(&b.description)));
    records
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn table_matches_file_after_sync(
        table in table_strategy(10),
        target in unique_records_strategy(10),
    ) {
        let db = TestDatabase::file();
        db.insert_raw(&table);
        let (mut engine, db) = engine(db);
        let xml = XmlFixture::new();
        let path = xml.write("deps.xml", &target);

        let before = ids(&db);
        let report = engine.sync_with_file(&path).unwrap();
        prop_assert_eq!(db.records(), sorted(target.clone()));
        prop_assert_eq!(report.xml_records, target.len());
        prop_assert_eq!(report.db_rows, table.len());

        // The first row scanned for each key in the file keeps its id
        let after = ids(&db);
        for record in &target {
            let first = before.iter().find(|(_, r)| r.key == record.key);
            let now = after.iter().find(|(_, r)| r.key == record.key);
            if let (Some((old_id, _)), Some((new_id, _))) = (first, now) {
                prop_assert_eq!(old_id, new_id);
            }
        }

        let again = engine.sync_with_file(&path).unwrap();
        prop_assert_eq!(again.mutations(), 0);
    }

    #[test]
    fn export_round_trip_is_stable(table in table_strategy(10)) {
        let db = TestDatabase::file();
        db.insert_raw(&table);
        let (mut engine, db) = engine(db);
        let xml = XmlFixture::new();
        let path = xml.path("export.xml");

        // Duplicate keys in the table make the export unreadable as a set
        let unique = {
            let mut keys: Vec<_> = table.iter().map(|r| r.to_record().key).collect();
            keys.sort();
            keys.windows(2).all(|w| w[0] != w[1])
        };

        engine.export_to_file(&path).unwrap();
        let before = db.raw_rows();
        let result = engine.sync_with_file(&path);
        if unique {
            prop_assert_eq!(result.unwrap().mutations(), 0);
        } else {
            prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::DuplicateKey);
        }
        prop_assert_eq!(db.raw_rows(), before);
    }
}
