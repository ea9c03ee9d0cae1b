//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size for paged listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Upper bound on any client-supplied page size.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Page-number pagination (`?page=&limit=`), 1-based.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit, DEFAULT_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Clamp an optional limit to `1..=MAX_PAGE_LIMIT`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_PAGE_LIMIT)
}
