//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - One capability trait per entity, each with a SQLite adapter.
//! - Own every piece of SQL text and every transaction boundary.
//!
//! # Invariants
//! - Repositories never swallow store errors; they attach the operation name.
//! - Point lookups report `RepoError::NotFound` instead of `Option`.
//! - Deletes by id are idempotent.

use crate::db::migrations::latest_version;
use log::warn;
use rusqlite::{Connection, Transaction, TransactionBehavior};

pub mod commodity_repo;
pub mod error;
pub mod market_repo;
pub mod solar_system_repo;

pub use error::{CascadeStep, RepoError, RepoResult};

/// Checks that `conn` is migrated to the current schema and exposes `tables`.
fn ensure_connection_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(RepoError::store("schema.check"))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1
                    FROM sqlite_master
                    WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )
            .map_err(RepoError::store("schema.check"))?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

/// Rejects NaN and infinities, which SQLite cannot round-trip faithfully.
fn ensure_finite(field: &'static str, value: f64) -> RepoResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RepoError::InvalidInput(format!(
            "{field} must be a finite number, got {value}"
        )))
    }
}

/// Runs `work` as one `IMMEDIATE` transaction on `conn`.
///
/// A failed begin or commit is reported as that step. Any error returned by
/// `work` rolls the whole unit back before it is passed on.
fn with_immediate_transaction<T>(
    conn: &Connection,
    operation: &'static str,
    work: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|err| {
        step_failed(CascadeStep::Begin, RepoError::from_sqlite(operation, err))
    })?;

    match work(&tx) {
        Ok(value) => {
            tx.commit().map_err(|err| {
                step_failed(CascadeStep::Commit, RepoError::from_sqlite(operation, err))
            })?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=transaction_rollback module=repo status=error operation={} error={}",
                    operation, rollback_err
                );
            }
            Err(err)
        }
    }
}

fn step_failed(step: CascadeStep, source: RepoError) -> RepoError {
    RepoError::TransactionFailure {
        step,
        source: Box::new(source),
    }
}
