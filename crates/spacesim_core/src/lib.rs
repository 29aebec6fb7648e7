//! Relational data-access core for the space simulation economy.
//!
//! Commodities, solar systems and the per-system commodity markets joining
//! them live in SQLite. This crate owns pagination and sort resolution, the
//! per-entity repositories, the solar system aggregate, the cascading delete,
//! and thin services over all of it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig, PaginationConfig};
pub use db::CancelHandle;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::commodity::{Commodity, CommodityUpdate};
pub use model::market::{CommodityMarket, CommodityMarketUpdate, NewCommodityMarket};
pub use model::solar_system::{SolarSystem, SolarSystemWithMarkets};
pub use model::EntityId;
pub use query::{Pagination, SortDirection, SortField};
pub use repo::commodity_repo::{CommodityRepository, SqliteCommodityRepository};
pub use repo::market_repo::{CommodityMarketRepository, SqliteCommodityMarketRepository};
pub use repo::solar_system_repo::{SolarSystemRepository, SqliteSolarSystemRepository};
pub use repo::{CascadeStep, RepoError, RepoResult};
pub use service::commodity_service::CommodityService;
pub use service::solar_system_service::SolarSystemService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
