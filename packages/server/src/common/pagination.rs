//! Offset pagination for list endpoints.
//!
//! Pages are 1-based on the wire (`?page=1&limit=10`) and turned into a
//! `LIMIT`/`OFFSET` pair here. Raw query values are forgiving: anything that
//! does not parse, or is below 1, falls back to the default instead of
//! failing the request.

use serde::Deserialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Raw `page` / `limit` query parameters as they arrive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn into_page(self) -> PageRequest {
        PageRequest::new(
            parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_LIMIT),
        )
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|n| *n >= 1)
}

/// Validated page request. `page >= 1`, `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    /// Clamps out-of-range values instead of rejecting them.
    pub fn new(page: i64, limit: i64) -> Self {
        let limit = if limit < 1 { DEFAULT_LIMIT } else { limit.min(MAX_LIMIT) };
        Self {
            page: page.max(1),
            limit,
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PageRequest {
        PageQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
        .into_page()
    }

    #[test]
    fn defaults_when_absent() {
        let page = query(None, None);
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let page = query(Some("3"), Some("25"));
        assert_eq!(page.offset(), 50);
    }

    #[test]
    fn garbage_and_non_positive_values_fall_back() {
        assert_eq!(query(Some("abc"), Some("x")), PageRequest::default());
        assert_eq!(query(Some("0"), Some("-4")), PageRequest::default());
        assert_eq!(query(Some("-2"), None).page(), 1);
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(query(None, Some("5000")).limit(), MAX_LIMIT);
        assert_eq!(PageRequest::new(1, 1000).limit(), MAX_LIMIT);
    }

    #[test]
    fn clamps_page_below_one() {
        let page = PageRequest::new(0, 10);
        assert_eq!(page.page(), 1);
        assert_eq!(page.offset(), 0);
    }
}
