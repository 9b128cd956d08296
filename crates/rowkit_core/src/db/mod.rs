//! SQLite transport boundary.
//!
//! # Responsibility
//! - Open and configure connections for the persistence core.
//! - Wrap the client library's error type behind one transport error.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout applied.
//! - Core code never matches on raw `rusqlite::Error` outside this boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::{open_store, open_store_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Transport-level error from the underlying SQLite client.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
