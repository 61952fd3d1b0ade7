//! Property-based test generators using proptest.
//!
//! Key fields are drawn from a small alphabet so that generated tables
//! and files share keys often, including the blank key.

use crate::fixtures::RawRow;
use proptest::prelude::*;
use xmlsync_record::{Record, RecordKey};

/// Strategy for a depCode or depJob value, empty included.
pub fn key_field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        4 => prop::string::string_regex("[A-C][0-2]?").expect("Invalid regex"),
    ]
}

/// Strategy for a description, empty and whitespace-padded included.
pub fn description_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        4 => prop::string::string_regex("[a-z]{1,6}").expect("Invalid regex"),
        1 => prop::string::string_regex(" [a-z&<]{0,3} ").expect("Invalid regex"),
    ]
}

/// Strategy for a record key.
pub fn key_strategy() -> impl Strategy<Value = RecordKey> {
    (key_field_strategy(), key_field_strategy()).prop_map(|(code, job)| RecordKey::new(code, job))
}

/// Strategy for up to `max` records with distinct keys, as found in a
/// valid XML file.
pub fn unique_records_strategy(max: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::btree_map(key_strategy(), description_strategy(), 0..=max).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(key, description)| Record { key, description })
                .collect()
        },
    )
}

/// Strategy for an optional column value, where NULL and "" both occur.
pub fn nullable_field_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None),
        5 => key_field_strategy().prop_map(Some),
    ]
}

/// Strategy for a raw table row.
pub fn raw_row_strategy() -> impl Strategy<Value = RawRow> {
    (
        nullable_field_strategy(),
        nullable_field_strategy(),
        prop_oneof![1 => Just(None), 5 => description_strategy().prop_map(Some)],
    )
        .prop_map(|(dep_code, dep_job, description)| RawRow {
            dep_code,
            dep_job,
            description,
        })
}

/// Strategy for up to `max` raw rows; keys may repeat.
pub fn table_strategy(max: usize) -> impl Strategy<Value = Vec<RawRow>> {
    prop::collection::vec(raw_row_strategy(), 0..=max)
}
