//! Solar system model and its market aggregate.

use super::market::CommodityMarket;
use super::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarSystem {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
}

impl SolarSystem {
    /// Builds an unsaved solar system with an empty id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
        }
    }
}

/// Read-only aggregate of one solar system and all of its markets.
///
/// Markets keep the order returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarSystemWithMarkets {
    pub id: EntityId,
    pub name: String,
    pub commodity_markets: Vec<CommodityMarket>,
}

impl SolarSystemWithMarkets {
    pub fn compose(system: SolarSystem, commodity_markets: Vec<CommodityMarket>) -> Self {
        Self {
            id: system.id,
            name: system.name,
            commodity_markets,
        }
    }
}
