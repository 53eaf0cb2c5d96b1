/// Page-number pagination
///
/// Every list endpoint shares the same scheme: `?page=N&limit=M` with a
/// configurable default and maximum page size, and the response envelope
/// `{count, next, previous, results}` carrying links to the neighboring
/// pages.
///
/// # Example
///
/// ```
/// use foodgram_shared::pagination::{Page, PageQuery, Paginated};
///
/// let page = Page::resolve(PageQuery { page: Some(2), limit: Some(10) }, 6, 100);
/// assert_eq!(page.offset(), 10);
///
/// let body = Paginated::new(25, page, "/api/recipes", vec!["r11", "r12"]);
/// assert_eq!(body.next.as_deref(), Some("/api/recipes?page=3&limit=10"));
/// assert_eq!(body.previous.as_deref(), Some("/api/recipes?page=1&limit=10"));
/// ```

use serde::{Deserialize, Serialize};

/// Default page size when the client does not pass `limit`
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Hard cap on the page size a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw pagination query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<u32>,

    /// Requested page size
    pub limit: Option<u32>,
}

/// A resolved page: validated number and size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: u32,

    /// Page size after applying the default and the cap
    pub size: u32,
}

impl Page {
    /// Resolves raw query parameters against a default and maximum size
    ///
    /// Out-of-range values are clamped rather than rejected: `page=0`
    /// becomes page 1 and an oversized `limit` becomes `max_size`.
    pub fn resolve(query: PageQuery, default_size: u32, max_size: u32) -> Self {
        let number = query.page.unwrap_or(1).max(1);
        let size = query.limit.unwrap_or(default_size).clamp(1, max_size);

        Self { number, size }
    }

    /// SQL OFFSET for this page
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }

    /// SQL LIMIT for this page
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// Paginated response envelope
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    /// Total number of matching rows across all pages
    pub count: i64,

    /// Link to the next page, if one exists
    pub next: Option<String>,

    /// Link to the previous page, if one exists
    pub previous: Option<String>,

    /// Rows of the current page
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Builds the envelope with neighbor-page links for `path`
    pub fn new(count: i64, page: Page, path: &str, results: Vec<T>) -> Self {
        let total_pages = if count <= 0 {
            0
        } else {
            (count + i64::from(page.size) - 1) / i64::from(page.size)
        };

        let link = |number: u32| format!("{}?page={}&limit={}", path, number, page.size);

        let next = if i64::from(page.number) < total_pages {
            Some(link(page.number + 1))
        } else {
            None
        };

        let previous = if page.number > 1 {
            Some(link(page.number - 1))
        } else {
            None
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let page = Page::resolve(PageQuery::default(), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

        assert_eq!(page.number, 1);
        assert_eq!(page.size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_limit_capped() {
        let query = PageQuery {
            page: Some(3),
            limit: Some(10_000),
        };
        let page = Page::resolve(query, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

        assert_eq!(page.size, MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 200);
    }

    #[test]
    fn test_page_zero_clamped() {
        let query = PageQuery {
            page: Some(0),
            limit: Some(0),
        };
        let page = Page::resolve(query, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

        assert_eq!(page.number, 1);
        assert_eq!(page.size, 1);
    }

    #[test]
    fn test_envelope_links() {
        let page = Page::resolve(
            PageQuery {
                page: Some(2),
                limit: Some(5),
            },
            DEFAULT_PAGE_SIZE,
            MAX_PAGE_SIZE,
        );
        let body = Paginated::new(12, page, "/api/users", vec![1, 2, 3, 4, 5]);

        assert_eq!(body.next.as_deref(), Some("/api/users?page=3&limit=5"));
        assert_eq!(body.previous.as_deref(), Some("/api/users?page=1&limit=5"));
    }

    #[test]
    fn test_envelope_edges() {
        let first = Page::resolve(
            PageQuery {
                page: None,
                limit: Some(5),
            },
            DEFAULT_PAGE_SIZE,
            MAX_PAGE_SIZE,
        );
        let body = Paginated::new(5, first, "/api/users", vec![1, 2, 3, 4, 5]);

        assert!(body.next.is_none());
        assert!(body.previous.is_none());

        let empty: Paginated<i32> = Paginated::new(0, first, "/api/users", Vec::new());
        assert_eq!(empty.count, 0);
        assert!(empty.next.is_none());
    }
}
