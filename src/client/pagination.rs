//! Pagination parameters for the repository listing
//!
//! GitHub pages are 1-indexed and capped at 100 items. A page shorter than
//! the requested size is the last one.

/// Maximum page size supported by the GitHub REST API.
pub const MAX_PAGE_SIZE: usize = 100;

/// A single page request.
///
/// # Example
/// ```ignore
/// let req = PageRequest::first().with_etag(Some("W/\"abc\"".into()));
/// let next = req.next();
/// assert_eq!(next.page, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: usize,
    /// Items per page
    pub per_page: usize,
    /// ETag sent as `If-None-Match`
    pub etag: Option<String>,
}

impl PageRequest {
    /// The first page at the maximum page size.
    pub fn first() -> Self {
        Self {
            page: 1,
            per_page: MAX_PAGE_SIZE,
            etag: None,
        }
    }

    /// Attach a conditional-request token.
    pub fn with_etag(mut self, etag: Option<String>) -> Self {
        self.etag = etag;
        self
    }

    /// The request for the following page, keeping size and token.
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            per_page: self.per_page,
            etag: self.etag.clone(),
        }
    }

    /// Whether this is the first page.
    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    /// Whether a page holding `len` items is the last one.
    pub fn is_last(&self, len: usize) -> bool {
        len < self.per_page
    }

    /// Query string parameters as (key, value) pairs.
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}
