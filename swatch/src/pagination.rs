//! Page/limit handling shared by every list-style query.

use serde::Serialize;

/// Page used when the caller gives none.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the caller gives none.
pub const DEFAULT_LIMIT: u64 = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request, replacing zero values with the defaults.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Parse raw query-string values leniently.
    ///
    /// Missing, non-numeric, negative and zero values fall back to the
    /// defaults rather than failing the request.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        fn parse(raw: Option<&str>) -> u64 {
            raw.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0)
        }
        Self::new(parse(page), parse(limit))
    }

    /// Number of rows preceding this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}
