//! Field accessor cache.
//!
//! # Responsibility
//! - Resolve field accessors by name once per (type, field) pair.
//! - Keep name lookups off the per-operation hot path.
//!
//! # Invariants
//! - The cache is append-only and never invalidated; record shapes are
//!   immutable for the process lifetime.
//! - Racing writers compute identical indexes, so the first insert wins and
//!   duplicates are discarded without corrupting state.

use super::{FieldDef, Record, RecordError, RecordResult};
use once_cell::sync::Lazy;
use rusqlite::types::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::RwLock;

static FIELD_INDEXES: Lazy<RwLock<HashMap<TypeId, HashMap<String, usize>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Resolves the accessor for `field` on `T`, memoizing the name lookup.
///
/// Unknown names are not cached, so a later registration typo keeps failing
/// loudly instead of pinning a stale miss.
pub fn field_of<T: Record>(field: &str) -> RecordResult<&'static FieldDef<T>> {
    let type_id = TypeId::of::<T>();

    let cached = read_lock()
        .get(&type_id)
        .and_then(|fields| fields.get(field))
        .copied();
    if let Some(index) = cached {
        return Ok(&T::fields()[index]);
    }

    let index = T::fields()
        .iter()
        .position(|def| def.name == field)
        .ok_or_else(|| RecordError::FieldNotFound {
            record: std::any::type_name::<T>(),
            field: field.to_string(),
        })?;

    write_lock()
        .entry(type_id)
        .or_default()
        .entry(field.to_string())
        .or_insert(index);

    Ok(&T::fields()[index])
}

/// Reads one field of `item` through its cached accessor.
pub fn read_field<T: Record>(item: &T, field: &str) -> RecordResult<Value> {
    Ok((field_of::<T>(field)?.get)(item))
}

/// Writes one field of `item` through its cached accessor.
pub fn write_field<T: Record>(item: &mut T, field: &str, value: Value) -> RecordResult<()> {
    (field_of::<T>(field)?.set)(item, value)
}

// Cache entries are idempotent indexes; a poisoned guard is safe to recover.
fn read_lock() -> std::sync::RwLockReadGuard<'static, HashMap<TypeId, HashMap<String, usize>>> {
    FIELD_INDEXES
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock() -> std::sync::RwLockWriteGuard<'static, HashMap<TypeId, HashMap<String, usize>>> {
    FIELD_INDEXES
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
