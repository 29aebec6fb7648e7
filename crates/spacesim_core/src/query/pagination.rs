//! Page/per-page/order-by parsing.
//!
//! # Invariants
//! - Parsing never fails. Missing values take configured defaults and
//!   unparsable numbers coerce to `0`.
//! - `per_page` above the configured maximum is clamped, never rejected.
//! - Derived `offset()`/`limit()` never go negative: a non-positive page
//!   reads as page 1 and a non-positive per-page reads as the default size.

use super::order_by::{resolve_direction, resolve_field, SortDirection, SortField};
use crate::config::PaginationConfig;

/// Normalized pagination directive built from untyped request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Requested page, 1-based. May hold a coerced `0` or a negative value.
    pub page: i64,
    /// Requested page size after the upper clamp.
    pub per_page: i64,
    /// Raw `field[,direction]` sort parameter.
    pub order_by: String,
    fallback_per_page: i64,
}

impl Pagination {
    /// Parses raw parameters using the default pagination configuration.
    pub fn parse(
        raw_page: Option<&str>,
        raw_per_page: Option<&str>,
        raw_order_by: Option<&str>,
    ) -> Self {
        Self::parse_with(
            &PaginationConfig::default(),
            raw_page,
            raw_per_page,
            raw_order_by,
        )
    }

    /// Parses raw parameters using explicit defaults and limits.
    ///
    /// An empty string counts as missing.
    pub fn parse_with(
        config: &PaginationConfig,
        raw_page: Option<&str>,
        raw_per_page: Option<&str>,
        raw_order_by: Option<&str>,
    ) -> Self {
        let page = parse_number(raw_page, config.default_page);
        let per_page = parse_number(raw_per_page, config.default_per_page).min(config.max_per_page);

        Self {
            page,
            per_page,
            order_by: raw_order_by.unwrap_or_default().to_string(),
            fallback_per_page: config.default_per_page.clamp(1, config.max_per_page.max(1)),
        }
    }

    /// Number of rows to skip: `(page - 1) * per_page`.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit())
    }

    /// Number of rows to return.
    pub fn limit(&self) -> i64 {
        if self.per_page > 0 {
            self.per_page
        } else {
            self.fallback_per_page
        }
    }

    /// Resolves the sort column against `allow_list`, falling back to
    /// `default`.
    pub fn sort_field(&self, allow_list: &[SortField], default: &'static str) -> &'static str {
        resolve_field(&self.order_by, allow_list, default)
    }

    pub fn sort_direction(&self) -> SortDirection {
        resolve_direction(&self.order_by)
    }

    /// Renders the `ORDER BY` clause body from trusted parts only.
    pub(crate) fn order_clause(&self, allow_list: &[SortField], default: &'static str) -> String {
        format!(
            "{} {}",
            self.sort_field(allow_list, default),
            self.sort_direction().as_sql()
        )
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::parse(None, None, None)
    }
}

fn parse_number(raw: Option<&str>, default: i64) -> i64 {
    match raw {
        None | Some("") => default,
        Some(value) => value.parse().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;
    use crate::config::PaginationConfig;
    use crate::query::SortDirection;

    #[test]
    fn missing_values_use_defaults() {
        let pagination = Pagination::parse(None, Some(""), None);
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.per_page, 10);
        assert_eq!(pagination.offset(), 0);
        assert_eq!(pagination.limit(), 10);
        assert_eq!(pagination.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn unparsable_numbers_coerce_to_zero() {
        let pagination = Pagination::parse(Some("abc"), Some("1.5"), None);
        assert_eq!(pagination.page, 0);
        assert_eq!(pagination.per_page, 0);
    }

    #[test]
    fn non_positive_values_never_produce_negative_offsets() {
        let pagination = Pagination::parse(Some("-3"), Some("0"), None);
        assert_eq!(pagination.offset(), 0);
        assert_eq!(pagination.limit(), 10);

        let negative_size = Pagination::parse(Some("2"), Some("-5"), None);
        assert_eq!(negative_size.limit(), 10);
        assert_eq!(negative_size.offset(), 10);
    }

    #[test]
    fn explicit_config_overrides_defaults_and_cap() {
        let config = PaginationConfig {
            default_page: 2,
            default_per_page: 5,
            max_per_page: 20,
        };
        let pagination = Pagination::parse_with(&config, None, Some("500"), None);
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.limit(), 20);
        assert_eq!(pagination.offset(), 20);
    }
}
