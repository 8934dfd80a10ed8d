//! Pagination helpers shared by list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size for paged endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page request parsed from query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: Option<i64>,
    /// Items per page
    pub per_page: Option<i64>,
}

impl PageRequest {
    /// Normalized page index (never negative).
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }

    /// Normalized page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// SQL OFFSET for this page.
    pub fn offset(&self) -> i64 {
        self.page() * self.per_page()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: None,
            per_page: None,
        }
    }
}

/// A single page of results with total count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total,
        }
    }

    /// An empty page for the given request.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Map the items of this page, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 0);
        assert_eq!(req.per_page(), DEFAULT_PAGE_SIZE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let req = PageRequest {
            page: Some(-3),
            per_page: Some(10_000),
        };
        assert_eq!(req.page(), 0);
        assert_eq!(req.per_page(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest {
            page: Some(2),
            per_page: Some(25),
        };
        assert_eq!(req.offset(), 50);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let req = PageRequest {
            page: Some(1),
            per_page: Some(2),
        };
        let page = Page::new(vec![1, 2], req, 10).map(|n| n * 2);
        assert_eq!(page.items, vec![2, 4]);
        assert_eq!(page.page, 1);
        assert_eq!(page.total, 10);
    }
}
