//! Commodity market repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `solar_system_commodity_markets`.
//! - Resolve the commodity display name by join in every read, one query per
//!   call regardless of how many markets are returned.
//! - Bulk deletes by parent used by the cascading delete and by commodity
//!   removal.
//!
//! # Invariants
//! - Market writes rely on the store's foreign keys to reject dangling
//!   `commodity_id` / `solar_system_id` values.
//! - `update` replaces `base_price` and `demand_quantity` together.
//! - Writes return the stored row from the same statement.

use super::{ensure_connection_ready, ensure_finite, RepoError, RepoResult};
use crate::model::market::{CommodityMarket, CommodityMarketUpdate, NewCommodityMarket};
use crate::model::new_entity_id;
use crate::query::{Pagination, SortField};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "commodity market";

/// Sort keys accepted for market listings.
pub const MARKET_SORT_FIELDS: &[SortField] = &[
    SortField::new("basePrice", "market.base_price"),
    SortField::new("demandQuantity", "market.demand_quantity"),
    SortField::new("commodityName", "commodity.name"),
    SortField::new("createdAt", "market.created_at"),
];
pub const MARKET_DEFAULT_SORT: &str = "market.created_at";

const MARKET_VIEW_SQL: &str = "SELECT
    market.id AS id,
    market.base_price AS base_price,
    market.demand_quantity AS demand_quantity,
    market.commodity_id AS commodity_id,
    market.solar_system_id AS solar_system_id,
    commodity.name AS commodity_name
FROM solar_system_commodity_markets market
INNER JOIN commodities commodity ON commodity.id = market.commodity_id";

/// Same columns as `MARKET_VIEW_SQL`, for writes that return the stored row.
const MARKET_RETURNING: &str = "id,
    base_price,
    demand_quantity,
    commodity_id,
    solar_system_id,
    (SELECT name FROM commodities WHERE commodities.id = commodity_id) AS commodity_name";

/// Repository interface for commodity markets.
pub trait CommodityMarketRepository {
    fn get_by_id(&self, id: &str) -> RepoResult<CommodityMarket>;
    fn list_by_pagination(&self, pagination: &Pagination) -> RepoResult<Vec<CommodityMarket>>;
    /// Lists all markets of one solar system in store order.
    fn list_by_solar_system_id(&self, solar_system_id: &str) -> RepoResult<Vec<CommodityMarket>>;
    fn create(&self, market: &NewCommodityMarket) -> RepoResult<CommodityMarket>;
    fn update(&self, id: &str, update: &CommodityMarketUpdate) -> RepoResult<CommodityMarket>;
    /// Deletes by id. Missing rows are not an error.
    fn remove(&self, id: &str) -> RepoResult<()>;
    /// Deletes every market of one solar system and returns the row count.
    fn remove_all_by_solar_system_id(&self, solar_system_id: &str) -> RepoResult<usize>;
    /// Deletes every market trading one commodity and returns the row count.
    fn remove_all_by_commodity_id(&self, commodity_id: &str) -> RepoResult<usize>;
}

/// SQLite-backed commodity market repository.
///
/// Accepts any `&Connection`, including a `rusqlite::Transaction` through
/// deref, so the same statements can run inside a caller's transaction.
pub struct SqliteCommodityMarketRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommodityMarketRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["commodities", "solar_system_commodity_markets"])?;
        Ok(Self { conn })
    }

    /// Wraps a connection already known to be migrated.
    pub(crate) fn with_connection(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_required(&self, id: &str, operation: &'static str) -> RepoResult<CommodityMarket> {
        self.conn
            .query_row(
                &format!("{MARKET_VIEW_SQL} WHERE market.id = ?1;"),
                [id],
                parse_market_row,
            )
            .optional()
            .map_err(RepoError::store(operation))?
            .ok_or_else(|| RepoError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })
    }
}

impl CommodityMarketRepository for SqliteCommodityMarketRepository<'_> {
    fn get_by_id(&self, id: &str) -> RepoResult<CommodityMarket> {
        self.load_required(id, "market.get_by_id")
    }

    fn list_by_pagination(&self, pagination: &Pagination) -> RepoResult<Vec<CommodityMarket>> {
        let sql = format!(
            "{MARKET_VIEW_SQL}
             ORDER BY {}
             LIMIT ?1 OFFSET ?2;",
            pagination.order_clause(MARKET_SORT_FIELDS, MARKET_DEFAULT_SORT)
        );
        let map_err = RepoError::store("market.list_by_pagination");

        let mut stmt = self.conn.prepare(&sql).map_err(&map_err)?;
        let rows = stmt
            .query_map(
                params![pagination.limit(), pagination.offset()],
                parse_market_row,
            )
            .map_err(&map_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(&map_err)
    }

    fn list_by_solar_system_id(&self, solar_system_id: &str) -> RepoResult<Vec<CommodityMarket>> {
        let map_err = RepoError::store("market.list_by_solar_system_id");

        let mut stmt = self
            .conn
            .prepare(&format!(
                "{MARKET_VIEW_SQL} WHERE market.solar_system_id = ?1;"
            ))
            .map_err(&map_err)?;
        let rows = stmt
            .query_map([solar_system_id], parse_market_row)
            .map_err(&map_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(&map_err)
    }

    fn create(&self, market: &NewCommodityMarket) -> RepoResult<CommodityMarket> {
        ensure_finite("basePrice", market.base_price)?;

        let created = self
            .conn
            .query_row(
                &format!(
                    "INSERT INTO solar_system_commodity_markets (
                        id,
                        base_price,
                        demand_quantity,
                        commodity_id,
                        solar_system_id
                    ) VALUES (?1, ?2, ?3, ?4, ?5)
                    RETURNING {MARKET_RETURNING};"
                ),
                params![
                    new_entity_id(),
                    market.base_price,
                    market.demand_quantity,
                    market.commodity_id.as_str(),
                    market.solar_system_id.as_str(),
                ],
                parse_market_row,
            )
            .map_err(RepoError::store("market.create"))?;

        debug!(
            "event=market_create module=repo status=ok id={} solar_system_id={} commodity_id={}",
            created.id, created.solar_system_id, created.commodity_id
        );
        Ok(created)
    }

    fn update(&self, id: &str, update: &CommodityMarketUpdate) -> RepoResult<CommodityMarket> {
        ensure_finite("basePrice", update.base_price)?;

        self.conn
            .query_row(
                &format!(
                    "UPDATE solar_system_commodity_markets
                     SET base_price = ?1, demand_quantity = ?2
                     WHERE id = ?3
                     RETURNING {MARKET_RETURNING};"
                ),
                params![update.base_price, update.demand_quantity, id],
                parse_market_row,
            )
            .optional()
            .map_err(RepoError::store("market.update"))?
            .ok_or_else(|| RepoError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })
    }

    fn remove(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM solar_system_commodity_markets WHERE id = ?1;",
                [id],
            )
            .map_err(RepoError::store("market.remove"))?;
        debug!(
            "event=market_remove module=repo status=ok id={} removed={}",
            id, changed
        );
        Ok(())
    }

    fn remove_all_by_solar_system_id(&self, solar_system_id: &str) -> RepoResult<usize> {
        self.conn
            .execute(
                "DELETE FROM solar_system_commodity_markets WHERE solar_system_id = ?1;",
                [solar_system_id],
            )
            .map_err(RepoError::store("market.remove_all_by_solar_system_id"))
    }

    fn remove_all_by_commodity_id(&self, commodity_id: &str) -> RepoResult<usize> {
        self.conn
            .execute(
                "DELETE FROM solar_system_commodity_markets WHERE commodity_id = ?1;",
                [commodity_id],
            )
            .map_err(RepoError::store("market.remove_all_by_commodity_id"))
    }
}

fn parse_market_row(row: &Row<'_>) -> rusqlite::Result<CommodityMarket> {
    Ok(CommodityMarket {
        id: row.get("id")?,
        base_price: row.get("base_price")?,
        demand_quantity: row.get("demand_quantity")?,
        commodity_id: row.get("commodity_id")?,
        solar_system_id: row.get("solar_system_id")?,
        commodity_name: row.get("commodity_name")?,
    })
}
