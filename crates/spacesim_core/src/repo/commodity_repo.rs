//! Commodity repository contract and SQLite implementation.
//!
//! # Invariants
//! - Ids are generated on insert; caller-supplied ids are ignored.
//! - Sorting only ever uses `COMMODITY_SORT_FIELDS` or `created_at`.
//! - `remove_with_markets` deletes a commodity and every market trading it
//!   in one `IMMEDIATE` transaction; a failed step keeps both in place.

use super::market_repo::{CommodityMarketRepository, SqliteCommodityMarketRepository};
use super::{
    ensure_connection_ready, ensure_finite, step_failed, with_immediate_transaction, CascadeStep,
    RepoError, RepoResult,
};
use crate::model::commodity::{Commodity, CommodityUpdate};
use crate::model::new_entity_id;
use crate::query::{Pagination, SortField};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "commodity";

/// Sort keys accepted for commodity listings.
pub const COMMODITY_SORT_FIELDS: &[SortField] = &[
    SortField::new("name", "name"),
    SortField::new("unitMass", "unit_mass"),
    SortField::new("unitVolume", "unit_volume"),
    SortField::new("createdAt", "created_at"),
];
pub const COMMODITY_DEFAULT_SORT: &str = "created_at";

const COMMODITY_COLUMNS: &str = "id, name, unit_mass, unit_volume";

/// Repository interface for commodities.
pub trait CommodityRepository {
    fn get_by_id(&self, id: &str) -> RepoResult<Commodity>;
    fn list_by_pagination(&self, pagination: &Pagination) -> RepoResult<Vec<Commodity>>;
    /// Inserts a commodity under a freshly generated id and returns the stored row.
    fn create(&self, commodity: &Commodity) -> RepoResult<Commodity>;
    /// Replaces mass and volume together.
    fn update(&self, id: &str, update: &CommodityUpdate) -> RepoResult<Commodity>;
    /// Deletes by id. Missing rows are not an error.
    fn remove(&self, id: &str) -> RepoResult<()>;
    /// Deletes every market trading the commodity, then the commodity, as one
    /// atomic unit. Returns the number of markets removed.
    fn remove_with_markets(&self, id: &str) -> RepoResult<usize>;
}

/// SQLite-backed commodity repository.
pub struct SqliteCommodityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommodityRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["commodities", "solar_system_commodity_markets"])?;
        Ok(Self { conn })
    }
}

impl CommodityRepository for SqliteCommodityRepository<'_> {
    fn get_by_id(&self, id: &str) -> RepoResult<Commodity> {
        self.conn
            .query_row(
                &format!("SELECT {COMMODITY_COLUMNS} FROM commodities WHERE id = ?1;"),
                [id],
                parse_commodity_row,
            )
            .optional()
            .map_err(RepoError::store("commodity.get_by_id"))?
            .ok_or_else(|| RepoError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })
    }

    fn list_by_pagination(&self, pagination: &Pagination) -> RepoResult<Vec<Commodity>> {
        let sql = format!(
            "SELECT {COMMODITY_COLUMNS}
             FROM commodities
             ORDER BY {}
             LIMIT ?1 OFFSET ?2;",
            pagination.order_clause(COMMODITY_SORT_FIELDS, COMMODITY_DEFAULT_SORT)
        );
        let map_err = RepoError::store("commodity.list_by_pagination");

        let mut stmt = self.conn.prepare(&sql).map_err(&map_err)?;
        let rows = stmt
            .query_map(
                params![pagination.limit(), pagination.offset()],
                parse_commodity_row,
            )
            .map_err(&map_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(&map_err)
    }

    fn create(&self, commodity: &Commodity) -> RepoResult<Commodity> {
        ensure_finite("unitMass", commodity.unit_mass)?;
        ensure_finite("unitVolume", commodity.unit_volume)?;

        let id = new_entity_id();
        let created = self
            .conn
            .query_row(
                &format!(
                    "INSERT INTO commodities (id, name, unit_mass, unit_volume)
                     VALUES (?1, ?2, ?3, ?4)
                     RETURNING {COMMODITY_COLUMNS};"
                ),
                params![
                    id,
                    commodity.name.as_str(),
                    commodity.unit_mass,
                    commodity.unit_volume
                ],
                parse_commodity_row,
            )
            .map_err(RepoError::store("commodity.create"))?;

        debug!("event=commodity_create module=repo status=ok id={}", created.id);
        Ok(created)
    }

    fn update(&self, id: &str, update: &CommodityUpdate) -> RepoResult<Commodity> {
        ensure_finite("unitMass", update.unit_mass)?;
        ensure_finite("unitVolume", update.unit_volume)?;

        self.conn
            .query_row(
                &format!(
                    "UPDATE commodities
                     SET unit_mass = ?1, unit_volume = ?2
                     WHERE id = ?3
                     RETURNING {COMMODITY_COLUMNS};"
                ),
                params![update.unit_mass, update.unit_volume, id],
                parse_commodity_row,
            )
            .optional()
            .map_err(RepoError::store("commodity.update"))?
            .ok_or_else(|| RepoError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })
    }

    fn remove(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM commodities WHERE id = ?1;", [id])
            .map_err(RepoError::store("commodity.remove"))?;
        debug!(
            "event=commodity_remove module=repo status=ok id={} removed={}",
            id, changed
        );
        Ok(())
    }

    fn remove_with_markets(&self, id: &str) -> RepoResult<usize> {
        let markets_removed =
            with_immediate_transaction(self.conn, "commodity.remove_with_markets", |tx| {
                let markets_removed = SqliteCommodityMarketRepository::with_connection(tx)
                    .remove_all_by_commodity_id(id)
                    .map_err(|err| step_failed(CascadeStep::DeleteMarkets, err))?;
                tx.execute("DELETE FROM commodities WHERE id = ?1;", [id])
                    .map_err(|err| {
                        step_failed(
                            CascadeStep::DeleteCommodity,
                            RepoError::from_sqlite("commodity.remove", err),
                        )
                    })?;
                Ok(markets_removed)
            })?;

        debug!(
            "event=commodity_remove_with_markets module=repo status=ok id={} markets_removed={}",
            id, markets_removed
        );
        Ok(markets_removed)
    }
}

fn parse_commodity_row(row: &Row<'_>) -> rusqlite::Result<Commodity> {
    Ok(Commodity {
        id: row.get("id")?,
        name: row.get("name")?,
        unit_mass: row.get("unit_mass")?,
        unit_volume: row.get("unit_volume")?,
    })
}
