//! Solar system use-case service.
//!
//! Covers solar systems and the markets they own. Removing a solar system
//! always goes through the repository cascade.

use super::{ServiceError, ServiceResult};
use crate::config::PaginationConfig;
use crate::model::market::{CommodityMarket, CommodityMarketUpdate, NewCommodityMarket};
use crate::model::solar_system::{SolarSystem, SolarSystemWithMarkets};
use crate::query::Pagination;
use crate::repo::market_repo::CommodityMarketRepository;
use crate::repo::solar_system_repo::SolarSystemRepository;

/// Solar system service facade over repository implementations.
pub struct SolarSystemService<S: SolarSystemRepository, M: CommodityMarketRepository> {
    systems: S,
    markets: M,
    pagination: PaginationConfig,
}

impl<S: SolarSystemRepository, M: CommodityMarketRepository> SolarSystemService<S, M> {
    pub fn new(systems: S, markets: M, pagination: PaginationConfig) -> Self {
        Self {
            systems,
            markets,
            pagination,
        }
    }

    /// Builds a pagination directive with this service's defaults.
    pub fn pagination(
        &self,
        raw_page: Option<&str>,
        raw_per_page: Option<&str>,
        raw_order_by: Option<&str>,
    ) -> Pagination {
        Pagination::parse_with(&self.pagination, raw_page, raw_per_page, raw_order_by)
    }

    /// Loads a solar system with all of its markets.
    pub fn find(&self, id: &str) -> ServiceResult<SolarSystemWithMarkets> {
        self.systems
            .load_with_markets(id)
            .map_err(ServiceError::wrap("finding solar system"))
    }

    pub fn list(&self, pagination: &Pagination) -> ServiceResult<Vec<SolarSystem>> {
        self.systems
            .list_by_pagination(pagination)
            .map_err(ServiceError::wrap("listing solar systems"))
    }

    pub fn create(&self, solar_system: &SolarSystem) -> ServiceResult<SolarSystem> {
        self.systems
            .create(solar_system)
            .map_err(ServiceError::wrap("creating solar system"))
    }

    /// Removes a solar system and every market it owns in one transaction.
    pub fn remove(&self, id: &str) -> ServiceResult<()> {
        self.systems
            .remove_cascade(id)
            .map_err(ServiceError::wrap("removing solar system"))
    }

    /// Lists the markets of one solar system. Unknown systems yield an empty list.
    pub fn list_markets(&self, solar_system_id: &str) -> ServiceResult<Vec<CommodityMarket>> {
        self.markets
            .list_by_solar_system_id(solar_system_id)
            .map_err(ServiceError::wrap("listing commodity markets"))
    }

    pub fn list_all_markets(&self, pagination: &Pagination) -> ServiceResult<Vec<CommodityMarket>> {
        self.markets
            .list_by_pagination(pagination)
            .map_err(ServiceError::wrap("listing commodity markets"))
    }

    pub fn find_market(&self, id: &str) -> ServiceResult<CommodityMarket> {
        self.markets
            .get_by_id(id)
            .map_err(ServiceError::wrap("finding commodity market"))
    }

    pub fn create_market(&self, market: &NewCommodityMarket) -> ServiceResult<CommodityMarket> {
        self.markets
            .create(market)
            .map_err(ServiceError::wrap("creating commodity market"))
    }

    /// Replaces base price and demand quantity together.
    pub fn update_market(
        &self,
        id: &str,
        update: &CommodityMarketUpdate,
    ) -> ServiceResult<CommodityMarket> {
        self.markets
            .update(id, update)
            .map_err(ServiceError::wrap("updating commodity market"))
    }

    pub fn remove_market(&self, id: &str) -> ServiceResult<()> {
        self.markets
            .remove(id)
            .map_err(ServiceError::wrap("removing commodity market"))
    }
}
