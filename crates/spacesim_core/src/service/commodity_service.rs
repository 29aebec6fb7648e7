//! Commodity use-case service.
//!
//! # Invariants
//! - Removing a commodity removes every market trading it in the same
//!   repository transaction, so no market is left pointing at a missing
//!   commodity and a failed removal changes nothing.

use super::{ServiceError, ServiceResult};
use crate::config::PaginationConfig;
use crate::model::commodity::{Commodity, CommodityUpdate};
use crate::query::Pagination;
use crate::repo::commodity_repo::CommodityRepository;
use log::info;

/// Commodity service facade over a repository implementation.
pub struct CommodityService<C: CommodityRepository> {
    commodities: C,
    pagination: PaginationConfig,
}

impl<C: CommodityRepository> CommodityService<C> {
    pub fn new(commodities: C, pagination: PaginationConfig) -> Self {
        Self {
            commodities,
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

    pub fn find(&self, id: &str) -> ServiceResult<Commodity> {
        self.commodities
            .get_by_id(id)
            .map_err(ServiceError::wrap("finding commodity"))
    }

    pub fn list(&self, pagination: &Pagination) -> ServiceResult<Vec<Commodity>> {
        self.commodities
            .list_by_pagination(pagination)
            .map_err(ServiceError::wrap("listing commodities"))
    }

    pub fn create(&self, commodity: &Commodity) -> ServiceResult<Commodity> {
        self.commodities
            .create(commodity)
            .map_err(ServiceError::wrap("creating commodity"))
    }

    /// Replaces unit mass and unit volume together.
    pub fn update(&self, id: &str, update: &CommodityUpdate) -> ServiceResult<Commodity> {
        self.commodities
            .update(id, update)
            .map_err(ServiceError::wrap("updating commodity"))
    }

    /// Removes the commodity together with every market trading it.
    pub fn remove(&self, id: &str) -> ServiceResult<()> {
        let markets_removed = self
            .commodities
            .remove_with_markets(id)
            .map_err(ServiceError::wrap("removing commodity"))?;
        info!(
            "event=commodity_remove module=service status=ok id={} markets_removed={}",
            id, markets_removed
        );
        Ok(())
    }
}
