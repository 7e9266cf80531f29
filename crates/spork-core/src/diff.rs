//! Flat constraint-table diff.

use crate::domain::{ChangeRecord, ConstraintTable};

/// Diff two constraint tables, driven by the keys of `old`.
///
/// A record is emitted for every key of `old` whose value differs in `new`,
/// including keys missing from `new`. Keys that only exist in `new` are never
/// reported. Output follows `old`'s iteration order.
pub fn diff_tables(old: &ConstraintTable, new: &ConstraintTable) -> Vec<ChangeRecord> {
    old.iter()
        .filter_map(|(cookbook, before)| {
            let after = new.get(cookbook);
            if after == Some(before) {
                None
            } else {
                Some(ChangeRecord::new(cookbook, before, after.map(String::as_str)))
            }
        })
        .collect()
}
