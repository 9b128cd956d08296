//! Connection bootstrap utilities for the SQLite store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Apply the pragmas and busy timeout the core relies on.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Schema ownership stays with the application; no migration runs here.

use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file configured for the persistence core.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>, busy_timeout: Duration) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=file");

    let result = Connection::open(path)
        .map_err(Into::into)
        .and_then(|conn| bootstrap_connection(conn, busy_timeout));
    report_open("file", started_at, &result);
    result
}

/// Opens an in-memory SQLite database configured for the persistence core.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store_in_memory(busy_timeout: Duration) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=memory");

    let result = Connection::open_in_memory()
        .map_err(Into::into)
        .and_then(|conn| bootstrap_connection(conn, busy_timeout));
    report_open("memory", started_at, &result);
    result
}

fn bootstrap_connection(conn: Connection, busy_timeout: Duration) -> DbResult<Connection> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    Ok(conn)
}

fn report_open(mode: &str, started_at: Instant, result: &DbResult<Connection>) {
    match result {
        Ok(_) => info!(
            "event=store_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=store_open module=db status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
}
