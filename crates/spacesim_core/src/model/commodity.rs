//! Commodity model.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// A tradable good.
///
/// `id` is assigned by the repository on create; any value supplied by the
/// caller is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commodity {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    /// Mass of one unit. Non-negative.
    pub unit_mass: f64,
    /// Volume of one unit. Non-negative.
    pub unit_volume: f64,
}

impl Commodity {
    /// Builds an unsaved commodity with an empty id.
    pub fn new(name: impl Into<String>, unit_mass: f64, unit_volume: f64) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            unit_mass,
            unit_volume,
        }
    }
}

/// Full replacement of the physical properties of a commodity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityUpdate {
    pub unit_mass: f64,
    pub unit_volume: f64,
}
