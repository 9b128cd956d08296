//! Non-null partial merge of two record instances.
//!
//! # Responsibility
//! - Combine an original snapshot with a sparsely populated update.
//!
//! # Invariants
//! - Pure function: no I/O, deterministic, independent of the store.
//! - Idempotent: merging the same update twice yields the same result.

use super::{Record, RecordResult};
use rusqlite::types::Value;

/// Returns a new record taking each field from `updated` when it is
/// non-null, otherwise from `original`.
pub fn merge_non_null<T: Record>(original: &T, updated: &T) -> RecordResult<T> {
    let mut merged = T::default();
    for def in T::fields() {
        let value = match (def.get)(updated) {
            Value::Null => (def.get)(original),
            value => value,
        };
        (def.set)(&mut merged, value)?;
    }
    Ok(merged)
}
