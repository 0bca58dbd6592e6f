//! Offset/limit pagination.

use serde::Deserialize;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Raw, optional pagination parameters as supplied by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Resolved window over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: usize,
    pub take: usize,
}

impl PaginationQuery {
    /// Resolve to a concrete window. Pages are 1-based; `0` is treated as `1`.
    pub fn resolve(&self, default_per_page: u32) -> Pagination {
        let per_page = match self.per_page {
            Some(n) if n > 0 => n,
            _ => default_per_page.max(1),
        };
        let page = self.page.unwrap_or(1).max(1);

        Pagination {
            skip: (page as usize - 1) * per_page as usize,
            take: per_page as usize,
        }
    }
}

impl Pagination {
    /// Apply the window to an already materialized result set.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.take).collect()
    }
}
