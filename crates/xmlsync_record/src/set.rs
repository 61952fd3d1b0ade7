//! Key-unique record collection.

use crate::key::RecordKey;
use crate::record::Record;
use std::collections::HashMap;
use thiserror::Error;

/// Two records normalized to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("more than one record with {key}")]
pub struct DuplicateKey {
    /// The offending key.
    pub key: RecordKey,
}

/// An unordered collection of records with unique keys.
///
/// Uniqueness is enforced on insertion: [`RecordSet::insert_unique`]
/// rejects a second record with an equal key instead of merging it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    entries: HashMap<RecordKey, String>,
}

impl RecordSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, failing if its key is already present.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKey`] naming the key if an equal key exists. The
    /// set is left unchanged in that case.
    pub fn insert_unique(&mut self, record: Record) -> Result<(), DuplicateKey> {
        use std::collections::hash_map::Entry;

        match self.entries.entry(record.key) {
            Entry::Occupied(entry) => Err(DuplicateKey {
                key: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(record.description);
                Ok(())
            }
        }
    }

    /// Removes the entry for `key`, returning its description.
    pub fn take(&mut self, key: &RecordKey) -> Option<String> {
        self.entries.remove(key)
    }

    /// Returns the description stored for `key`.
    #[must_use]
    pub fn get(&self, key: &RecordKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the set, yielding its records in unspecified order.
    pub fn into_records(self) -> impl Iterator<Item = Record> {
        self.entries
            .into_iter()
            .map(|(key, description)| Record { key, description })
    }
}

impl TryFrom<Vec<Record>> for RecordSet {
    type Error = DuplicateKey;

    fn try_from(records: Vec<Record>) -> Result<Self, Self::Error> {
        let mut set = RecordSet::new();
        for record in records {
            set.insert_unique(record)?;
        }
        Ok(set)
    }
}
