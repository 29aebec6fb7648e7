//! Domain model for the simulation economy.
//!
//! # Invariants
//! - Every entity is identified by an opaque, server-generated string id.
//! - A commodity market always belongs to exactly one solar system and
//!   references exactly one commodity.
//! - Read views (`CommodityMarket::commodity_name`, `SolarSystemWithMarkets`)
//!   are assembled on read and never persisted.

pub mod commodity;
pub mod market;
pub mod solar_system;

/// Opaque entity identifier.
pub type EntityId = String;

/// Generates a fresh, globally unique entity identifier.
pub(crate) fn new_entity_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}
