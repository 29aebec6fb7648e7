//! Allow-list resolution for dynamic `ORDER BY`.
//!
//! The raw order-by parameter has the shape `field[,direction[,...]]`.

use std::fmt::{Display, Formatter};

/// One allow-list entry: a client-facing sort key and the trusted storage
/// expression it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub client_name: &'static str,
    pub expression: &'static str,
}

impl SortField {
    pub const fn new(client_name: &'static str, expression: &'static str) -> Self {
        Self {
            client_name,
            expression,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Maps the field segment of `raw_order_by` to a trusted storage expression.
///
/// Only the text before the first comma is considered. Matching against
/// `client_name` ignores ASCII case. Anything unknown yields `default`.
pub fn resolve_field(
    raw_order_by: &str,
    allow_list: &[SortField],
    default: &'static str,
) -> &'static str {
    let candidate = raw_order_by.split(',').next().unwrap_or_default();
    allow_list
        .iter()
        .find(|field| field.client_name.eq_ignore_ascii_case(candidate))
        .map_or(default, |field| field.expression)
}

/// Reads the direction segment of `raw_order_by`.
///
/// Only the exact, lowercase second segment `desc` selects descending order.
pub fn resolve_direction(raw_order_by: &str) -> SortDirection {
    match raw_order_by.split(',').nth(1) {
        Some("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_direction, resolve_field, SortDirection, SortField};

    const FIELDS: &[SortField] = &[
        SortField::new("name", "name"),
        SortField::new("unitMass", "unit_mass"),
    ];

    #[test]
    fn field_match_ignores_case_and_direction_suffix() {
        assert_eq!(resolve_field("NAME", FIELDS, "created_at"), "name");
        assert_eq!(resolve_field("unitmass,desc", FIELDS, "created_at"), "unit_mass");
    }

    #[test]
    fn unknown_or_hostile_field_falls_back_to_default() {
        assert_eq!(resolve_field("", FIELDS, "created_at"), "created_at");
        assert_eq!(
            resolve_field("; DROP TABLE x", FIELDS, "created_at"),
            "created_at"
        );
        assert_eq!(
            resolve_field("name; DROP TABLE x,desc", FIELDS, "created_at"),
            "created_at"
        );
        assert_eq!(resolve_field(",name", FIELDS, "created_at"), "created_at");
    }

    #[test]
    fn direction_is_exact_and_case_sensitive() {
        assert_eq!(resolve_direction("name,desc"), SortDirection::Desc);
        assert_eq!(resolve_direction("name,DESC"), SortDirection::Asc);
        assert_eq!(resolve_direction("name"), SortDirection::Asc);
        assert_eq!(resolve_direction("desc"), SortDirection::Asc);
        assert_eq!(resolve_direction("name,desc,extra"), SortDirection::Desc);
        assert_eq!(resolve_direction("name, desc"), SortDirection::Asc);
    }
}
