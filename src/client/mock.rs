//! Mock GitHub API client for testing
//!
//! Replies are scripted per organization and consumed in order, so a test can
//! lay out exactly what each successive page request sees.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::models::{RateLimitStatus, Repository};
use super::pagination::{MAX_PAGE_SIZE, PageRequest};
use super::rate_limit::RateLimitHeaders;
use super::{GitHubApi, PageResponse};
use crate::error::{ApiError, Result};

type Reply = std::result::Result<PageResponse, ApiError>;

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockGitHubClient::new()
///     .with_repos("acme", repos(150))
///     .await;
///
/// let resp = mock.list_org_repos_page("acme", &PageRequest::first()).await?;
/// ```
#[derive(Default)]
pub struct MockGitHubClient {
    /// Scripted replies per organization
    replies: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    /// Captured page requests for assertions
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
    /// Quota returned from rate_limit
    rate: Arc<Mutex<Option<RateLimitStatus>>>,
    /// Artificial latency per page request
    latency: Option<Duration>,
    /// Number of page requests in flight right now
    in_flight: Arc<std::sync::atomic::AtomicUsize>,
    /// Highest number of concurrent page requests observed
    max_in_flight: Arc<std::sync::atomic::AtomicUsize>,
    /// Number of rate_limit calls
    rate_limit_calls: Arc<std::sync::atomic::AtomicUsize>,
}

/// A captured page request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub org: String,
    pub page: usize,
    pub per_page: usize,
    pub etag: Option<String>,
}

/// `count` repositories named `{org}/repo-{i}`, alternating enabled/disabled.
pub fn repos(org: &str, count: usize) -> Vec<Repository> {
    (0..count)
        .map(|i| {
            let status = if i % 2 == 0 { "enabled" } else { "disabled" };
            Repository::new(format!("{}/repo-{}", org, i)).with_secret_scanning(status)
        })
        .collect()
}

fn page_reply(org: &str, index: usize, repos: Vec<Repository>, has_next: Option<bool>) -> PageResponse {
    PageResponse::Page {
        etag: (index == 0).then(|| format!("\"etag-{}\"", org)),
        repos,
        has_next,
    }
}

impl MockGitHubClient {
    /// Create a new mock client with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one reply for `org`.
    pub async fn with_reply(self, org: &str, reply: PageResponse) -> Self {
        self.push(org, Ok(reply)).await;
        self
    }

    /// Append an error reply for `org`.
    pub async fn with_error(self, org: &str, error: ApiError) -> Self {
        self.push(org, Err(error)).await;
        self
    }

    /// Append `count` throttled replies carrying `hints`.
    pub async fn with_throttles(self, org: &str, count: usize, hints: RateLimitHeaders) -> Self {
        for _ in 0..count {
            self.push(org, Ok(PageResponse::Throttled(hints.clone()))).await;
        }
        self
    }

    /// Append the pages GitHub would return for `repos`.
    ///
    /// The first page carries the ETag `"etag-{org}"`. Multi-page listings
    /// carry `Link` information the way GitHub does; a single page has none,
    /// so a single full page is followed by an empty one.
    pub async fn with_repos(self, org: &str, repos: Vec<Repository>) -> Self {
        let total = repos.len();
        let mut pages: Vec<Vec<Repository>> =
            repos.chunks(MAX_PAGE_SIZE).map(|c| c.to_vec()).collect();
        if pages.is_empty() {
            pages.push(Vec::new());
        }

        let count = pages.len();
        for (i, page) in pages.into_iter().enumerate() {
            let has_next = (count > 1).then_some(i + 1 < count);
            self.push(org, Ok(page_reply(org, i, page, has_next))).await;
        }
        if total == MAX_PAGE_SIZE {
            self.push(org, Ok(page_reply(org, 1, Vec::new(), None))).await;
        }
        self
    }

    /// Append the pages of a server that sends no `Link` headers.
    ///
    /// When the total is a multiple of the page size a trailing empty page is
    /// added, since only a short page marks the end.
    pub async fn with_repos_without_links(self, org: &str, repos: Vec<Repository>) -> Self {
        let total = repos.len();
        let mut pages: Vec<Vec<Repository>> =
            repos.chunks(MAX_PAGE_SIZE).map(|c| c.to_vec()).collect();
        if total % MAX_PAGE_SIZE == 0 {
            pages.push(Vec::new());
        }

        for (i, page) in pages.into_iter().enumerate() {
            self.push(org, Ok(page_reply(org, i, page, None))).await;
        }
        self
    }

    /// Configure the quota returned from rate_limit.
    pub async fn with_rate(self, rate: RateLimitStatus) -> Self {
        *self.rate.lock().await = Some(rate);
        self
    }

    /// Delay every page request by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Get all captured requests.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().await.clone()
    }

    /// Captured requests for one organization.
    pub async fn requests_for(&self, org: &str) -> Vec<CapturedRequest> {
        self.captured_requests
            .lock()
            .await
            .iter()
            .filter(|r| r.org == org)
            .cloned()
            .collect()
    }

    /// Highest number of page requests observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of rate_limit calls made.
    pub fn rate_limit_calls(&self) -> usize {
        self.rate_limit_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    async fn push(&self, org: &str, reply: Reply) {
        self.replies
            .lock()
            .await
            .entry(org.to_string())
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl GitHubApi for MockGitHubClient {
    async fn list_org_repos_page(&self, org: &str, page: &PageRequest) -> Result<PageResponse> {
        use std::sync::atomic::Ordering;

        self.captured_requests.lock().await.push(CapturedRequest {
            org: org.to_string(),
            page: page.page,
            per_page: page.per_page,
            etag: page.etag.clone(),
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = self
            .replies
            .lock()
            .await
            .get_mut(org)
            .and_then(|q| q.pop_front());

        match reply {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(e)) => Err(e.into()),
            None => Err(ApiError::Status {
                status: 404,
                message: format!("No scripted reply for {} page {}", org, page.page),
            }
            .into()),
        }
    }

    async fn rate_limit(&self) -> Result<RateLimitStatus> {
        self.rate_limit_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let rate = *self.rate.lock().await;
        rate.ok_or_else(|| ApiError::Network("rate limit not configured".to_string()).into())
    }
}
