//! `ORDER BY ... LIMIT ...` fragments for paginated listings.
//!
//! Sort fields and directions are written into the SQL verbatim. Check them against an
//! allow-list before they get here.

use std::fmt;

pub const SORT_ASCENDING: &str = "ASC";
pub const SORT_DESCENDING: &str = "DESC";

/// Builder form of [`build_page_limits`].
///
/// ```
/// use sqlx_pdo_driver::Pagination;
///
/// let stub = Pagination::new().sort_by("created_at", "DESC").limit(25).page(3);
/// assert_eq!(stub.to_string(), "ORDER BY created_at DESC LIMIT 75, 25");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    sort_field: String,
    sort_direction: String,
    limit: Option<u64>,
    page: Option<u64>,
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty direction sorts ascending.
    pub fn sort_by(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.sort_field = field.into();
        self.sort_direction = direction.into();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Zero-based page index; ignored without a limit.
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.sort_direction.is_empty() {
            SORT_ASCENDING
        } else {
            self.sort_direction.as_str()
        };

        let mut parts = Vec::with_capacity(2);
        if !self.sort_field.is_empty() {
            parts.push(format!("ORDER BY {} {}", self.sort_field, direction));
        }

        match (self.limit.filter(|l| *l > 0), self.page.filter(|p| *p > 0)) {
            (Some(limit), Some(page)) => {
                parts.push(format!("LIMIT {}, {}", limit.saturating_mul(page), limit))
            }
            (Some(limit), None) => parts.push(format!("LIMIT {limit}")),
            (None, _) => {}
        }

        f.write_str(&parts.join(" "))
    }
}

/// Builds an appendable `ORDER BY`/`LIMIT` stub.
///
/// `ORDER BY` is emitted only for a non-empty `sort_field`; `LIMIT` only for a positive
/// `limit`, with an offset of `limit * page` when `page` is positive too.
///
/// ```
/// use sqlx_pdo_driver::build_page_limits;
///
/// assert_eq!(build_page_limits("name", "", Some(10), Some(2)), "ORDER BY name ASC LIMIT 20, 10");
/// assert_eq!(build_page_limits("", "DESC", Some(5), None), "LIMIT 5");
/// assert_eq!(build_page_limits("", "", None, None), "");
/// ```
pub fn build_page_limits(
    sort_field: &str,
    sort_direction: &str,
    limit: Option<u64>,
    page: Option<u64>,
) -> String {
    let mut pagination = Pagination::new().sort_by(sort_field, sort_direction);
    pagination.limit = limit;
    pagination.page = page;
    pagination.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_render_nothing() {
        assert_eq!(Pagination::new().to_string(), "");
        assert_eq!(build_page_limits("", SORT_ASCENDING, None, None), "");
    }

    #[test]
    fn test_sort_only() {
        assert_eq!(build_page_limits("name", SORT_DESCENDING, None, None), "ORDER BY name DESC");
    }

    #[test]
    fn test_empty_direction_defaults_to_ascending() {
        assert_eq!(build_page_limits("name", "", Some(10), Some(2)), "ORDER BY name ASC LIMIT 20, 10");
    }

    #[test]
    fn test_limit_without_sort_has_no_leading_space() {
        assert_eq!(build_page_limits("", "DESC", Some(5), None), "LIMIT 5");
    }

    #[test]
    fn test_zero_limit_and_page_are_ignored() {
        assert_eq!(build_page_limits("id", "ASC", Some(0), Some(4)), "ORDER BY id ASC");
        assert_eq!(build_page_limits("id", "ASC", Some(10), Some(0)), "ORDER BY id ASC LIMIT 10");
    }

    #[test]
    fn test_page_without_limit_is_ignored() {
        assert_eq!(Pagination::new().page(3).to_string(), "");
    }
}
