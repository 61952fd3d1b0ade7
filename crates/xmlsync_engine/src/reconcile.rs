//! Row classification.

use xmlsync_db::RowAction;
use xmlsync_record::{DbRecord, RecordSet};

/// Decides what happens to one table row.
///
/// If the row's key is still pending in `pending`, the entry is removed
/// and the row is kept or updated depending on whether the descriptions
/// are equal. Otherwise the row is deleted. Entries left in `pending`
/// after every row has been classified are the records to insert.
///
/// Because matched entries are removed, a second row with an already
/// matched key is deleted: duplicate keys in the table collapse onto the
/// first row scanned.
pub fn classify(row: &DbRecord, pending: &mut RecordSet) -> RowAction {
    match pending.take(row.key()) {
        Some(description) if description == row.description() => RowAction::Keep,
        Some(description) => RowAction::Update(description),
        None => RowAction::Delete,
    }
}
