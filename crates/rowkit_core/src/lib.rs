//! Generic record persistence core for SQLite-backed applications.
//! This crate is the single source of truth for transactional CRUD,
//! sequential value assignment and record metadata invariants.

pub mod db;
pub mod logging;
pub mod record;
pub mod store;

pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use record::accessor::{field_of, read_field, write_field};
pub use record::merge::merge_non_null;
pub use record::predicate::where_clause;
pub use record::{
    primary_key_of, FieldDef, FieldKind, FieldValue, Record, RecordError, RecordResult,
};
pub use store::sequence::{assign_next_values, has_sequential};
pub use store::{
    CancelToken, LookupItem, RecordStore, SqliteStore, StatementEvent, StoreError, StoreOptions,
    StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
