//! Sequential value assignment for fields without a native identity column.
//!
//! # Responsibility
//! - Derive the next value for sequential fields from the stored maximum.
//! - Assign it through the cached field accessor before insert.
//!
//! # Invariants
//! - Runs on the caller's connection/transaction; rolling back the insert
//!   discards everything but the in-memory assignment.
//! - Default isolation does not serialize concurrent assignments: two
//!   concurrent inserts can read the same maximum. Callers needing
//!   serialization enable `StoreOptions::eager_write_lock`.

use super::{StoreError, StoreResult};
use crate::db::DbError;
use crate::record::accessor::field_of;
use crate::record::{FieldKind, Record, RecordError};
use rusqlite::types::Value;
use rusqlite::Connection;

/// Returns whether `T` registers any sequential fields.
pub fn has_sequential<T: Record>() -> bool {
    T::fields().iter().any(|def| def.sequential)
}

/// Assigns `max(column) + step` to every sequential field of `item`,
/// in declaration order.
///
/// # Errors
/// - `RecordError::SequentialKind` when a tagged field is not integer-kind.
/// - `StoreError::Sequence` when the maximum cannot be read.
pub fn assign_next_values<T: Record>(
    conn: &Connection,
    item: &mut T,
    step: i64,
) -> StoreResult<()> {
    for def in T::fields().iter().filter(|def| def.sequential) {
        if def.kind != FieldKind::Integer {
            return Err(StoreError::Record(RecordError::SequentialKind {
                record: std::any::type_name::<T>(),
                field: def.name,
                kind: def.kind,
            }));
        }

        let accessor = field_of::<T>(def.name)?;
        let sql = format!(
            "SELECT MAX(COALESCE({}, 0)) FROM {};",
            def.name,
            T::table()
        );
        let max: Option<i64> = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|err| StoreError::Sequence {
                record: std::any::type_name::<T>(),
                field: def.name,
                source: DbError::Sqlite(err),
            })?;

        let next = max.unwrap_or(0) + step;
        (accessor.set)(item, Value::Integer(next))?;
    }
    Ok(())
}
