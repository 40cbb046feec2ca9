//! This module defines the common functionality for paging list responses.

use serde::{Deserialize, Serialize};

/// The page number to default to when not specified in a request.
pub const DEFAULT_PAGE: usize = 1;
/// The number of rows per page when not specified in a request.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The page selection from a list request's query string.
///
/// Pages are one-based. Missing fields fall back to the first page of
/// [DEFAULT_PAGE_SIZE] rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    /// The one-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    /// The number of rows per page.
    #[serde(default = "default_page_size")]
    pub limit: usize,
}

fn default_page() -> usize {
    DEFAULT_PAGE
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    /// The number of rows to skip to land on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.limit
    }
}

/// The paging summary included alongside a page of rows in list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// How many rows match the query in total.
    pub total: usize,
    /// How many pages the rows span at the requested page size.
    pub pages: usize,
    /// The one-based page that was returned.
    pub current_page: usize,
}

impl Pagination {
    /// Summarize a result of `total` rows paged by `params`.
    pub fn new(total: usize, params: &PageParams) -> Self {
        Self {
            total,
            pages: total.div_ceil(params.limit.max(1)),
            current_page: params.page,
        }
    }
}
