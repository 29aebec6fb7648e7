//! Query directives shared by all repositories.
//!
//! # Responsibility
//! - Turn untyped page/per-page/order-by strings into a `Pagination`.
//! - Resolve caller-chosen sort keys against closed allow-lists.
//!
//! # Invariants
//! - Sort expressions placed into SQL text always come from a `'static`
//!   allow-list or a `'static` default, never from caller input.

pub mod order_by;
pub mod pagination;

pub use order_by::{resolve_direction, resolve_field, SortDirection, SortField};
pub use pagination::Pagination;
