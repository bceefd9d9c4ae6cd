//! GitHub REST API client

use async_trait::async_trait;

use crate::error::Result;

pub mod github;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;
pub mod rate_limit;

pub use github::GitHubClient;
#[cfg(test)]
pub use mock::MockGitHubClient;
pub use models::{RateLimitStatus, Repository};
pub use pagination::PageRequest;
pub use rate_limit::RateLimitHeaders;

/// Classified response to a single page request.
///
/// Non-retryable failures are returned as errors instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PageResponse {
    /// HTTP 304: the `If-None-Match` token still matches
    NotModified,

    /// HTTP 403/429 caused by rate limiting, with the server's hints
    Throttled(RateLimitHeaders),

    /// HTTP 2xx with the decoded page
    Page {
        /// `ETag` response header, if any
        etag: Option<String>,
        /// Repositories on this page, in server order
        repos: Vec<Repository>,
        /// Whether the `Link` header advertises a next page; `None` when the
        /// response carried no `Link` header at all
        has_next: Option<bool>,
    },
}

/// GitHub API operations used by the scanner
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Fetch one page of `GET /orgs/{org}/repos`
    async fn list_org_repos_page(&self, org: &str, page: &PageRequest) -> Result<PageResponse>;

    /// Current core rate limit quota from `GET /rate_limit`
    async fn rate_limit(&self) -> Result<RateLimitStatus>;
}
