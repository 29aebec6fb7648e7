//! Solar system repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `solar_systems`.
//! - Compose a solar system with its markets into one read model.
//! - Remove a solar system together with its markets as one atomic unit.
//!
//! # Invariants
//! - The cascade deletes children before the parent, inside one
//!   `IMMEDIATE` transaction. Any failed step rolls back every step.
//! - `remove` alone is refused by the store while markets still reference
//!   the system; use `remove_cascade` for that.

use super::market_repo::{CommodityMarketRepository, SqliteCommodityMarketRepository};
use super::{
    ensure_connection_ready, step_failed, with_immediate_transaction, CascadeStep, RepoError,
    RepoResult,
};
use crate::model::new_entity_id;
use crate::model::solar_system::{SolarSystem, SolarSystemWithMarkets};
use crate::query::{Pagination, SortField};
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::time::Instant;

const ENTITY: &str = "solar system";

/// Sort keys accepted for solar system listings.
pub const SOLAR_SYSTEM_SORT_FIELDS: &[SortField] = &[
    SortField::new("name", "name"),
    SortField::new("createdAt", "created_at"),
];
pub const SOLAR_SYSTEM_DEFAULT_SORT: &str = "created_at";

/// Repository interface for solar systems and their market aggregate.
pub trait SolarSystemRepository {
    fn get_by_id(&self, id: &str) -> RepoResult<SolarSystem>;
    fn list_by_pagination(&self, pagination: &Pagination) -> RepoResult<Vec<SolarSystem>>;
    /// Inserts a solar system under a freshly generated id.
    fn create(&self, solar_system: &SolarSystem) -> RepoResult<SolarSystem>;
    /// Deletes the bare row by id. Missing rows are not an error.
    fn remove(&self, id: &str) -> RepoResult<()>;
    /// Loads one solar system with every market and its commodity name.
    fn load_with_markets(&self, id: &str) -> RepoResult<SolarSystemWithMarkets>;
    /// Deletes a solar system and all of its markets atomically.
    fn remove_cascade(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed solar system repository.
pub struct SqliteSolarSystemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSolarSystemRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                "commodities",
                "solar_systems",
                "solar_system_commodity_markets",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl SolarSystemRepository for SqliteSolarSystemRepository<'_> {
    fn get_by_id(&self, id: &str) -> RepoResult<SolarSystem> {
        self.conn
            .query_row(
                "SELECT id, name FROM solar_systems WHERE id = ?1;",
                [id],
                parse_solar_system_row,
            )
            .optional()
            .map_err(RepoError::store("solar_system.get_by_id"))?
            .ok_or_else(|| RepoError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })
    }

    fn list_by_pagination(&self, pagination: &Pagination) -> RepoResult<Vec<SolarSystem>> {
        let sql = format!(
            "SELECT id, name
             FROM solar_systems
             ORDER BY {}
             LIMIT ?1 OFFSET ?2;",
            pagination.order_clause(SOLAR_SYSTEM_SORT_FIELDS, SOLAR_SYSTEM_DEFAULT_SORT)
        );
        let map_err = RepoError::store("solar_system.list_by_pagination");

        let mut stmt = self.conn.prepare(&sql).map_err(&map_err)?;
        let rows = stmt
            .query_map(
                params![pagination.limit(), pagination.offset()],
                parse_solar_system_row,
            )
            .map_err(&map_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(&map_err)
    }

    fn create(&self, solar_system: &SolarSystem) -> RepoResult<SolarSystem> {
        let created = self
            .conn
            .query_row(
                "INSERT INTO solar_systems (id, name)
                 VALUES (?1, ?2)
                 RETURNING id, name;",
                params![new_entity_id(), solar_system.name.as_str()],
                parse_solar_system_row,
            )
            .map_err(RepoError::store("solar_system.create"))?;

        debug!(
            "event=solar_system_create module=repo status=ok id={}",
            created.id
        );
        Ok(created)
    }

    fn remove(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM solar_systems WHERE id = ?1;", [id])
            .map_err(RepoError::store("solar_system.remove"))?;
        debug!(
            "event=solar_system_remove module=repo status=ok id={} removed={}",
            id, changed
        );
        Ok(())
    }

    fn load_with_markets(&self, id: &str) -> RepoResult<SolarSystemWithMarkets> {
        let system = self.get_by_id(id)?;
        let markets =
            SqliteCommodityMarketRepository::with_connection(self.conn).list_by_solar_system_id(id)?;
        Ok(SolarSystemWithMarkets::compose(system, markets))
    }

    fn remove_cascade(&self, id: &str) -> RepoResult<()> {
        let started_at = Instant::now();
        info!("event=solar_system_cascade_delete module=repo status=start id={id}");

        match with_immediate_transaction(self.conn, "solar_system.remove_cascade", |tx| {
            delete_system_and_markets(tx, id)
        }) {
            Ok(markets_removed) => {
                info!(
                    "event=solar_system_cascade_delete module=repo status=ok id={} markets_removed={} duration_ms={}",
                    id,
                    markets_removed,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=solar_system_cascade_delete module=repo status=error id={} duration_ms={} error_kind={} error={}",
                    id,
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Deletes markets, then the system. Returns the number of markets removed.
fn delete_system_and_markets(tx: &Transaction<'_>, id: &str) -> RepoResult<usize> {
    let markets_removed = SqliteCommodityMarketRepository::with_connection(tx)
        .remove_all_by_solar_system_id(id)
        .map_err(|err| step_failed(CascadeStep::DeleteMarkets, err))?;

    tx.execute("DELETE FROM solar_systems WHERE id = ?1;", [id])
        .map_err(|err| {
            step_failed(
                CascadeStep::DeleteSolarSystem,
                RepoError::from_sqlite("solar_system.remove", err),
            )
        })?;

    Ok(markets_removed)
}

fn parse_solar_system_row(row: &Row<'_>) -> rusqlite::Result<SolarSystem> {
    Ok(SolarSystem {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}
