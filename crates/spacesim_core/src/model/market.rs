//! Per-system commodity market model.
//!
//! # Invariants
//! - `commodity_name` is resolved by join at read time and never stored.
//! - `base_price` and `demand_quantity` are only ever replaced together.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// Denormalized read view of one market row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityMarket {
    pub id: EntityId,
    pub base_price: f64,
    pub demand_quantity: u32,
    pub commodity_id: EntityId,
    pub solar_system_id: EntityId,
    /// Display name of the referenced commodity.
    pub commodity_name: String,
}

/// Write model for creating a market. The id is generated on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommodityMarket {
    pub solar_system_id: EntityId,
    pub commodity_id: EntityId,
    pub base_price: f64,
    pub demand_quantity: u32,
}

/// Full replacement of the mutable market fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityMarketUpdate {
    pub base_price: f64,
    pub demand_quantity: u32,
}
