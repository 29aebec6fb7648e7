//! Schema migrations for the economy store.
//!
//! Each step is a numbered SQL script. The number of the last applied step
//! lives in `PRAGMA user_version`; a store stamped with a number this binary
//! does not know is refused rather than guessed at.
//!
//! # Invariants
//! - Step numbers start at 1 and increase by exactly one.
//! - Pending steps run inside one transaction together with the version
//!   stamp, so a failing script leaves the store at its previous version.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// One numbered schema change.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "market_indexes",
        sql: include_str!("0002_market_indexes.sql"),
    },
];

/// Schema version this binary migrates stores up to.
pub fn latest_version() -> u32 {
    latest_in(SCHEMA_STEPS)
}

/// Brings `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    migrate(conn, SCHEMA_STEPS)
}

fn latest_in(steps: &[SchemaStep]) -> u32 {
    steps.last().map_or(0, |step| step.version)
}

fn migrate(conn: &mut Connection, steps: &[SchemaStep]) -> DbResult<()> {
    let stored: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let target = latest_in(steps);

    if stored > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: target,
        });
    }
    let pending: Vec<&SchemaStep> = steps.iter().filter(|step| step.version > stored).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.pragma_update(None, "user_version", target)?;
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        stored,
        target,
        pending.len()
    );
    Ok(())
}
