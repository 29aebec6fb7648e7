//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the simulation economy store.
//! - Apply schema migrations in deterministic order.
//! - Expose a cancellation handle for in-flight statements.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories must not touch `commodities`, `solar_systems` or
//!   `solar_system_commodity_markets` before migrations succeed.

use rusqlite::{Connection, InterruptHandle};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_configured, open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Caller-owned cancellation switch for one connection.
///
/// The handle is `Send + Sync` and may be moved to another thread (a request
/// deadline watcher, for example). Cancelling aborts the statement currently
/// running on the connection; repositories report it as
/// `RepoError::Cancelled` and open transactions are rolled back on drop.
#[derive(Clone)]
pub struct CancelHandle {
    inner: std::sync::Arc<InterruptHandle>,
}

impl CancelHandle {
    /// Creates a cancellation handle bound to `conn`.
    pub fn for_connection(conn: &Connection) -> Self {
        Self {
            inner: std::sync::Arc::new(conn.get_interrupt_handle()),
        }
    }

    /// Interrupts any statement currently executing on the bound connection.
    pub fn cancel(&self) {
        log::warn!("event=db_cancel module=db status=requested");
        self.inner.interrupt();
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}
