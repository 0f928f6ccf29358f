//! Pagination types for listing queries.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PER_PAGE: u64 = 12;
/// Maximum page size.
const MAX_PER_PAGE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.per_page
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit(&self) -> u64 {
        self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: u64, per_page: u64, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            total_items.div_ceil(per_page)
        };
        Self {
            items,
            page,
            per_page,
            total_items,
            total_pages,
        }
    }

    /// Map the items of this page, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    DEFAULT_PER_PAGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_limit() {
        let page = PageRequest::new(3, 10);
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn page_is_clamped_to_one() {
        let page = PageRequest::new(0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn per_page_is_clamped_to_max() {
        let page = PageRequest::new(1, 10_000);
        assert_eq!(page.per_page, 100);
    }

    #[test]
    fn total_pages_rounds_up() {
        let resp = PageResponse::new(vec![1, 2, 3], 1, 7, 15);
        assert_eq!(resp.total_pages, 3);

        let empty: PageResponse<i32> = PageResponse::new(vec![], 1, 7, 0);
        assert_eq!(empty.total_pages, 1);
    }
}
