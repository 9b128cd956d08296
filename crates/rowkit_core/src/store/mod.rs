//! Transactional CRUD executor over SQLite.
//!
//! # Responsibility
//! - Run generic insert/update/delete operations as atomic units of work.
//! - Route match-by-example reads through predicate synthesis.
//! - Publish statement and followup observer events without affecting
//!   operation outcomes.
//!
//! # Invariants
//! - Every write owns exactly one transaction, released on all exit paths.
//! - Write-path failures roll back first, then surface typed; read-path
//!   failures surface unwrapped.
//! - Observer callbacks never change an operation's result.

use crate::db::{self, DbError};
use crate::record::accessor::field_of;
use crate::record::predicate::where_clause;
use crate::record::{primary_key_of, FieldDef, Record, RecordError};
use log::{error, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

pub mod sequence;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from CRUD executor operations.
#[derive(Debug)]
pub enum StoreError {
    /// A write failed after its transaction opened; the work was rolled back.
    Persistence {
        phase: &'static str,
        source: DbError,
    },
    /// Sequential assignment could not derive a next value.
    Sequence {
        record: &'static str,
        field: &'static str,
        source: DbError,
    },
    /// Record metadata or value conversion problem.
    Record(RecordError),
    /// Cancellation observed before the operation completed.
    Cancelled,
    /// Pass-through transport error from the read path.
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence { phase, source } => {
                write!(f, "{phase} failed, rolled back: {source}")
            }
            Self::Sequence {
                record,
                field,
                source,
            } => write!(
                f,
                "sequential assignment failed for `{record}.{field}`: {source}"
            ),
            Self::Record(err) => write!(f, "{err}"),
            Self::Cancelled => write!(f, "operation cancelled before completion"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => Some(source),
            Self::Sequence { source, .. } => Some(source),
            Self::Record(err) => Some(err),
            Self::Cancelled => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<RecordError> for StoreError {
    fn from(value: RecordError) -> Self {
        Self::Record(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Cooperative cancellation signal checked between store round-trips.
///
/// A token observed cancelled at operation entry fails the call before any
/// store I/O; observed mid-write it triggers the normal rollback path.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> StoreResult<()> {
        if self.is_cancelled() {
            Err(StoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Statement text and timestamp published to statement observers.
#[derive(Debug, Clone)]
pub struct StatementEvent {
    pub text: String,
    pub at: SystemTime,
}

/// Label/value pair projected for presentation-layer lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupItem {
    pub label: String,
    pub value: Value,
}

/// Store construction options.
///
/// Plain data; the defaults match a conservative single-writer setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Database file path; `None` opens an in-memory store.
    pub path: Option<PathBuf>,
    /// Busy timeout applied to the connection.
    pub busy_timeout_ms: u64,
    /// Take the write lock at transaction start instead of at first write.
    /// Required when sequential fields are assigned under concurrency.
    pub eager_write_lock: bool,
    /// Publish statement events to registered observers.
    pub log_statements: bool,
    /// Increment applied by sequential field assignment.
    pub sequence_step: i64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
            eager_write_lock: false,
            log_statements: false,
            sequence_step: 1,
        }
    }
}

/// Generic CRUD surface parameterized by record type.
///
/// Write operations are atomic: they commit on success and roll back on any
/// failure. Read operations are pass-through fetches.
pub trait RecordStore {
    /// Inserts one record, assigning sequential fields first when `T`
    /// registers any. Returns the store identity: the populated integer
    /// primary key when present, else the last insert rowid.
    fn insert<T: Record>(&self, item: &mut T) -> StoreResult<i64>;
    /// All-or-nothing batch insert sharing one transaction. `timeout` is
    /// applied as the connection busy timeout for the duration of the call.
    fn insert_many<T: Record>(&self, items: &mut [T], timeout: Duration) -> StoreResult<usize>;
    /// Full-row update keyed by the registered primary key. Zero affected
    /// rows is a valid outcome, not an error.
    fn update<T: Record>(&self, item: &T) -> StoreResult<usize>;
    /// Full-row update keyed by an explicit primary-key value.
    fn update_by_key<T: Record>(&self, key: Value, item: &T) -> StoreResult<usize>;
    /// Rewrites only the named fields; an empty slice rewrites all fields.
    fn update_fields<T: Record>(&self, item: &T, fields: &[&str]) -> StoreResult<usize>;
    /// Field-subset update constrained by a caller-supplied predicate.
    fn update_where<T: Record>(
        &self,
        predicate: &str,
        item: &T,
        fields: &[&str],
    ) -> StoreResult<usize>;
    /// Hard delete by primary key; returns the affected-row count.
    fn delete_by_key<T: Record>(&self, key: Value) -> StoreResult<usize>;
    /// Deletes matching rows. `soft` resets every non-key field to its
    /// `T::default()` value instead of removing rows.
    fn delete_where<T: Record>(&self, predicate: &str, soft: bool) -> StoreResult<usize>;
    /// Rows matching a caller-supplied predicate.
    fn select<T: Record>(&self, predicate: &str) -> StoreResult<Vec<T>>;
    /// Rows matching a predicate synthesized from `example`'s non-null fields.
    fn select_matching<T: Record>(&self, example: &T) -> StoreResult<Vec<T>>;
    /// All rows of `T`'s table.
    fn select_all<T: Record>(&self) -> StoreResult<Vec<T>>;
    /// One row by primary key.
    fn select_by_key<T: Record>(&self, key: Value) -> StoreResult<Option<T>>;
    /// First row of an arbitrary query mapped to `T`.
    fn select_one<T: Record>(&self, sql: &str, args: &[Value]) -> StoreResult<Option<T>>;
    /// Arbitrary query mapped to `T`.
    fn select_by_sql<T: Record>(&self, sql: &str, args: &[Value]) -> StoreResult<Vec<T>>;
    /// Dictionary-shaped rows for queries without a mapped record type.
    fn select_rows(&self, sql: &str, args: &[Value])
        -> StoreResult<Vec<HashMap<String, Value>>>;
    /// Label/value projection of two registered fields of `T`.
    fn lookup<T: Record>(&self, label_field: &str, value_field: &str)
        -> StoreResult<Vec<LookupItem>>;
    /// Direct statement execution outside the record model.
    fn execute(&self, sql: &str, args: &[Value]) -> StoreResult<usize>;
    /// Single scalar query; `None` when the query yields no row.
    fn query_scalar(&self, sql: &str, args: &[Value]) -> StoreResult<Option<Value>>;
}

/// SQLite-backed CRUD executor.
pub struct SqliteStore {
    conn: Connection,
    eager_write_lock: bool,
    sequence_step: i64,
    busy_timeout: Duration,
    log_statements: Cell<bool>,
    last_statement: RefCell<Option<String>>,
    statement_observers: RefCell<Vec<Box<dyn Fn(&StatementEvent)>>>,
    followup_observers: RefCell<Vec<Box<dyn Fn(bool)>>>,
}

impl SqliteStore {
    /// Opens a store from options, file-backed or in-memory.
    pub fn open(options: &StoreOptions) -> StoreResult<Self> {
        let busy_timeout = Duration::from_millis(options.busy_timeout_ms);
        let conn = match &options.path {
            Some(path) => db::open_store(path, busy_timeout)?,
            None => db::open_store_in_memory(busy_timeout)?,
        };
        Ok(Self::from_connection(conn, options))
    }

    /// Wraps an already-open connection. The connection's pragmas are left
    /// untouched; callers own its configuration.
    pub fn from_connection(conn: Connection, options: &StoreOptions) -> Self {
        Self {
            conn,
            eager_write_lock: options.eager_write_lock,
            sequence_step: options.sequence_step,
            busy_timeout: Duration::from_millis(options.busy_timeout_ms),
            log_statements: Cell::new(options.log_statements),
            last_statement: RefCell::new(None),
            statement_observers: RefCell::new(Vec::new()),
            followup_observers: RefCell::new(Vec::new()),
        }
    }

    /// Registers a statement observer. Fire-and-forget: panics inside the
    /// callback are caught and logged.
    pub fn on_statement(&self, observer: impl Fn(&StatementEvent) + 'static) {
        self.statement_observers.borrow_mut().push(Box::new(observer));
    }

    /// Enables or disables statement event publication.
    pub fn set_statement_logging(&self, enabled: bool) {
        self.log_statements.set(enabled);
    }

    /// Registers a followup observer for caller-triggered downstream actions.
    pub fn on_followup(&self, observer: impl Fn(bool) + 'static) {
        self.followup_observers.borrow_mut().push(Box::new(observer));
    }

    /// Notifies followup observers that a downstream action is requested.
    ///
    /// Decoupled from persistence entirely; only ever triggered explicitly
    /// by the caller after an operation.
    pub fn request_followup(&self, requested: bool) {
        for observer in self.followup_observers.borrow().iter() {
            if catch_unwind(AssertUnwindSafe(|| observer(requested))).is_err() {
                warn!("event=followup_observer module=store status=panic");
            }
        }
    }

    /// Returns the text of the last statement issued, if any.
    pub fn last_statement(&self) -> Option<String> {
        self.last_statement.borrow().clone()
    }

    /// Returns the underlying connection for operations outside the generic
    /// record model.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Cancellable form of [`RecordStore::insert`].
    pub fn insert_with<T: Record>(&self, item: &mut T, cancel: &CancelToken) -> StoreResult<i64> {
        cancel.check()?;
        self.run_write("insert", |store, tx| {
            if sequence::has_sequential::<T>() {
                sequence::assign_next_values(tx, item, store.sequence_step)?;
            }
            cancel.check()?;
            let sql = insert_sql::<T>();
            store.note_statement(&sql);
            let params: Vec<Value> = T::fields().iter().map(|def| (def.get)(item)).collect();
            tx.execute(&sql, params_from_iter(params))?;
            Ok(identity_of(tx, item))
        })
    }

    /// Cancellable form of [`RecordStore::insert_many`].
    pub fn insert_many_with<T: Record>(
        &self,
        items: &mut [T],
        timeout: Duration,
        cancel: &CancelToken,
    ) -> StoreResult<usize> {
        cancel.check()?;
        if let Err(err) = self.conn.busy_timeout(timeout) {
            return Err(StoreError::Persistence {
                phase: "bulk insert",
                source: DbError::Sqlite(err),
            });
        }

        let outcome = self.run_write("bulk insert", |store, tx| {
            let sql = insert_sql::<T>();
            store.note_statement(&sql);
            let mut stmt = tx.prepare(&sql)?;
            let mut inserted = 0;
            for item in items.iter_mut() {
                cancel.check()?;
                if sequence::has_sequential::<T>() {
                    sequence::assign_next_values(tx, item, store.sequence_step)?;
                }
                let params: Vec<Value> = T::fields().iter().map(|def| (def.get)(item)).collect();
                stmt.execute(params_from_iter(params))?;
                inserted += 1;
            }
            Ok(inserted)
        });

        if let Err(err) = self.conn.busy_timeout(self.busy_timeout) {
            warn!("event=busy_timeout_restore module=store status=error error={err}");
        }
        outcome
    }

    /// Cancellable form of [`RecordStore::update`].
    pub fn update_with<T: Record>(&self, item: &T, cancel: &CancelToken) -> StoreResult<usize> {
        cancel.check()?;
        let key_def = primary_key_of::<T>()?;
        self.update_by_key_inner((key_def.get)(item), item)
    }

    /// Cancellable form of [`RecordStore::update_fields`].
    pub fn update_fields_with<T: Record>(
        &self,
        item: &T,
        fields: &[&str],
        cancel: &CancelToken,
    ) -> StoreResult<usize> {
        cancel.check()?;
        let key_def = primary_key_of::<T>()?;
        let defs = resolve_subset::<T>(fields)?;
        self.run_write("update", |store, tx| {
            let (assignments, mut params) = update_parts(item, &defs);
            params.push((key_def.get)(item));
            let sql = format!(
                "UPDATE {} SET {} WHERE {} = ?{};",
                T::table(),
                assignments,
                key_def.name,
                params.len()
            );
            store.note_statement(&sql);
            Ok(tx.execute(&sql, params_from_iter(params))?)
        })
    }

    /// Cancellable form of [`RecordStore::execute`].
    pub fn execute_with(
        &self,
        sql: &str,
        args: &[Value],
        cancel: &CancelToken,
    ) -> StoreResult<usize> {
        cancel.check()?;
        self.note_statement(sql);
        let outcome = self
            .conn
            .execute(sql, params_from_iter(args.iter().cloned()))
            .map_err(StoreError::from);
        self.publish_statement();
        outcome
    }

    /// Cancellable form of [`RecordStore::select_all`].
    pub fn select_all_with<T: Record>(&self, cancel: &CancelToken) -> StoreResult<Vec<T>> {
        cancel.check()?;
        self.fetch_records(&format!("{};", select_sql::<T>()), &[])
    }

    fn update_by_key_inner<T: Record>(&self, key: Value, item: &T) -> StoreResult<usize> {
        let key_def = primary_key_of::<T>()?;
        self.run_write("update", |store, tx| {
            let defs: Vec<&FieldDef<T>> =
                T::fields().iter().filter(|def| !def.primary_key).collect();
            let (assignments, mut params) = update_parts(item, &defs);
            params.push(key);
            let sql = format!(
                "UPDATE {} SET {} WHERE {} = ?{};",
                T::table(),
                assignments,
                key_def.name,
                params.len()
            );
            store.note_statement(&sql);
            Ok(tx.execute(&sql, params_from_iter(params))?)
        })
    }

    fn run_write<R>(
        &self,
        phase: &'static str,
        op: impl FnOnce(&Self, &Transaction<'_>) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let outcome = self.run_write_inner(phase, op);
        self.publish_statement();
        outcome
    }

    fn run_write_inner<R>(
        &self,
        phase: &'static str,
        op: impl FnOnce(&Self, &Transaction<'_>) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let behavior = if self.eager_write_lock {
            TransactionBehavior::Immediate
        } else {
            TransactionBehavior::Deferred
        };
        let tx = Transaction::new_unchecked(&self.conn, behavior).map_err(|err| {
            StoreError::Persistence {
                phase,
                source: DbError::Sqlite(err),
            }
        })?;

        match op(self, &tx) {
            Ok(result) => match tx.commit() {
                Ok(()) => Ok(result),
                Err(err) => Err(StoreError::Persistence {
                    phase,
                    source: DbError::Sqlite(err),
                }),
            },
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=rollback module=store status=error phase={phase} error={rollback_err}"
                    );
                }
                Err(wrap_write_error(phase, err))
            }
        }
    }

    fn fetch_records<T: Record>(&self, sql: &str, args: &[Value]) -> StoreResult<Vec<T>> {
        self.note_statement(sql);
        let outcome = (|| {
            let mut stmt = self.conn.prepare(sql)?;
            let mut rows = stmt.query(params_from_iter(args.iter().cloned()))?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(record_from_row::<T>(row)?);
            }
            Ok(items)
        })();
        self.publish_statement();
        outcome
    }

    fn note_statement(&self, sql: &str) {
        *self.last_statement.borrow_mut() = Some(sql.to_string());
    }

    fn publish_statement(&self) {
        if !self.log_statements.get() {
            return;
        }
        let Some(text) = self.last_statement.borrow().clone() else {
            return;
        };
        let event = StatementEvent {
            text,
            at: SystemTime::now(),
        };
        for observer in self.statement_observers.borrow().iter() {
            if catch_unwind(AssertUnwindSafe(|| observer(&event))).is_err() {
                warn!("event=statement_observer module=store status=panic");
            }
        }
    }
}

impl RecordStore for SqliteStore {
    fn insert<T: Record>(&self, item: &mut T) -> StoreResult<i64> {
        self.insert_with(item, &CancelToken::new())
    }

    fn insert_many<T: Record>(&self, items: &mut [T], timeout: Duration) -> StoreResult<usize> {
        self.insert_many_with(items, timeout, &CancelToken::new())
    }

    fn update<T: Record>(&self, item: &T) -> StoreResult<usize> {
        self.update_with(item, &CancelToken::new())
    }

    fn update_by_key<T: Record>(&self, key: Value, item: &T) -> StoreResult<usize> {
        self.update_by_key_inner(key, item)
    }

    fn update_fields<T: Record>(&self, item: &T, fields: &[&str]) -> StoreResult<usize> {
        self.update_fields_with(item, fields, &CancelToken::new())
    }

    fn update_where<T: Record>(
        &self,
        predicate: &str,
        item: &T,
        fields: &[&str],
    ) -> StoreResult<usize> {
        let defs = resolve_subset::<T>(fields)?;
        self.run_write("update", |store, tx| {
            let (assignments, params) = update_parts(item, &defs);
            let sql = format!(
                "UPDATE {} SET {} WHERE {};",
                T::table(),
                assignments,
                predicate
            );
            store.note_statement(&sql);
            Ok(tx.execute(&sql, params_from_iter(params))?)
        })
    }

    fn delete_by_key<T: Record>(&self, key: Value) -> StoreResult<usize> {
        let key_def = primary_key_of::<T>()?;
        self.run_write("delete", |store, tx| {
            let sql = format!("DELETE FROM {} WHERE {} = ?1;", T::table(), key_def.name);
            store.note_statement(&sql);
            Ok(tx.execute(&sql, [key])?)
        })
    }

    fn delete_where<T: Record>(&self, predicate: &str, soft: bool) -> StoreResult<usize> {
        if soft {
            self.run_write("soft delete", |store, tx| {
                let zero = T::default();
                let defs: Vec<&FieldDef<T>> =
                    T::fields().iter().filter(|def| !def.primary_key).collect();
                let (assignments, params) = update_parts(&zero, &defs);
                let sql = format!(
                    "UPDATE {} SET {} WHERE {};",
                    T::table(),
                    assignments,
                    predicate
                );
                store.note_statement(&sql);
                Ok(tx.execute(&sql, params_from_iter(params))?)
            })
        } else {
            self.run_write("delete", |store, tx| {
                let sql = format!("DELETE FROM {} WHERE {};", T::table(), predicate);
                store.note_statement(&sql);
                Ok(tx.execute(&sql, [])?)
            })
        }
    }

    fn select<T: Record>(&self, predicate: &str) -> StoreResult<Vec<T>> {
        let sql = format!("{} WHERE {};", select_sql::<T>(), predicate);
        self.fetch_records(&sql, &[])
    }

    fn select_matching<T: Record>(&self, example: &T) -> StoreResult<Vec<T>> {
        let predicate = where_clause(example)?;
        self.select(&predicate)
    }

    fn select_all<T: Record>(&self) -> StoreResult<Vec<T>> {
        self.select_all_with(&CancelToken::new())
    }

    fn select_by_key<T: Record>(&self, key: Value) -> StoreResult<Option<T>> {
        let key_def = primary_key_of::<T>()?;
        let sql = format!("{} WHERE {} = ?1;", select_sql::<T>(), key_def.name);
        Ok(self.fetch_records(&sql, &[key])?.into_iter().next())
    }

    fn select_one<T: Record>(&self, sql: &str, args: &[Value]) -> StoreResult<Option<T>> {
        Ok(self.fetch_records(sql, args)?.into_iter().next())
    }

    fn select_by_sql<T: Record>(&self, sql: &str, args: &[Value]) -> StoreResult<Vec<T>> {
        self.fetch_records(sql, args)
    }

    fn select_rows(
        &self,
        sql: &str,
        args: &[Value],
    ) -> StoreResult<Vec<HashMap<String, Value>>> {
        self.note_statement(sql);
        let outcome = (|| {
            let mut stmt = self.conn.prepare(sql)?;
            let column_names: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let mut rows = stmt.query(params_from_iter(args.iter().cloned()))?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                let mut map = HashMap::with_capacity(column_names.len());
                for (index, name) in column_names.iter().enumerate() {
                    map.insert(name.clone(), row.get::<_, Value>(index)?);
                }
                items.push(map);
            }
            Ok(items)
        })();
        self.publish_statement();
        outcome
    }

    fn lookup<T: Record>(
        &self,
        label_field: &str,
        value_field: &str,
    ) -> StoreResult<Vec<LookupItem>> {
        let label_def = field_of::<T>(label_field)?;
        let value_def = field_of::<T>(value_field)?;
        let sql = format!(
            "SELECT {}, {} FROM {};",
            label_def.name,
            value_def.name,
            T::table()
        );
        self.note_statement(&sql);
        let outcome = (|| {
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(LookupItem {
                    label: label_text(row.get::<_, Value>(0)?),
                    value: row.get::<_, Value>(1)?,
                });
            }
            Ok(items)
        })();
        self.publish_statement();
        outcome
    }

    fn execute(&self, sql: &str, args: &[Value]) -> StoreResult<usize> {
        self.execute_with(sql, args, &CancelToken::new())
    }

    fn query_scalar(&self, sql: &str, args: &[Value]) -> StoreResult<Option<Value>> {
        self.note_statement(sql);
        let outcome = self
            .conn
            .query_row(sql, params_from_iter(args.iter().cloned()), |row| {
                row.get::<_, Value>(0)
            })
            .optional()
            .map_err(StoreError::from);
        self.publish_statement();
        outcome
    }
}

// Typed record/cancellation errors pass through after rollback; transport
// errors are re-signalled with the write phase attached.
fn wrap_write_error(phase: &'static str, err: StoreError) -> StoreError {
    match err {
        StoreError::Db(source) => StoreError::Persistence { phase, source },
        other => other,
    }
}

fn insert_sql<T: Record>() -> String {
    let names: Vec<&str> = T::fields().iter().map(|def| def.name).collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|index| format!("?{index}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        T::table(),
        names.join(", "),
        placeholders.join(", ")
    )
}

fn select_sql<T: Record>() -> String {
    let names: Vec<&str> = T::fields().iter().map(|def| def.name).collect();
    format!("SELECT {} FROM {}", names.join(", "), T::table())
}

fn update_parts<T: Record>(item: &T, defs: &[&FieldDef<T>]) -> (String, Vec<Value>) {
    let mut assignments = Vec::with_capacity(defs.len());
    let mut params = Vec::with_capacity(defs.len() + 1);
    for def in defs {
        params.push((def.get)(item));
        assignments.push(format!("{} = ?{}", def.name, params.len()));
    }
    (assignments.join(", "), params)
}

fn resolve_subset<T: Record>(fields: &[&str]) -> StoreResult<Vec<&'static FieldDef<T>>> {
    if fields.is_empty() {
        return Ok(T::fields().iter().filter(|def| !def.primary_key).collect());
    }
    fields
        .iter()
        .map(|name| field_of::<T>(name).map_err(StoreError::from))
        .collect()
}

fn identity_of<T: Record>(tx: &Transaction<'_>, item: &T) -> i64 {
    let populated_key = T::fields()
        .iter()
        .find(|def| def.primary_key)
        .map(|def| (def.get)(item))
        .and_then(|value| match value {
            Value::Integer(v) => Some(v),
            _ => None,
        });
    populated_key.unwrap_or_else(|| tx.last_insert_rowid())
}

fn record_from_row<T: Record>(row: &Row<'_>) -> StoreResult<T> {
    let mut item = T::default();
    for def in T::fields() {
        let value: Value = row.get(def.name)?;
        (def.set)(&mut item, value)?;
    }
    Ok(item)
}

fn label_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(text) => text,
        Value::Blob(_) => String::new(),
    }
}
