//! GitHub API client implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, ETAG, IF_NONE_MATCH, LINK, USER_AGENT};
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::models::{RateLimitResponse, RateLimitStatus, Repository};
use super::pagination::PageRequest;
use super::rate_limit::{RateLimitHeaders, RequestPacer};
use super::{GitHubApi, PageResponse};
use crate::error::{ApiError, Result};

/// GitHub REST API base URL
pub const API_BASE_URL: &str = "https://api.github.com";

/// Pinned REST API version
pub const API_VERSION: &str = "2022-11-28";

const ACCEPT_HEADER: &str = "application/vnd.github+json";

/// GitHub API client
///
/// Cheap to share behind an `Arc`; every clone of the pacer is the same
/// limiter, so all workers draw from one request budget.
pub struct GitHubClient {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
    pacer: Arc<RequestPacer>,
}

impl GitHubClient {
    /// Create a new client. `None` means anonymous access.
    pub fn new(token: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: API_BASE_URL.to_string(),
            token,
            pacer: Arc::new(RequestPacer::default()),
        })
    }

    /// Point the client at a different API host (GitHub Enterprise, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the client-side request rate.
    pub fn with_requests_per_second(mut self, per_second: u32) -> Self {
        self.pacer = Arc::new(RequestPacer::new(per_second));
        self
    }

    /// Whether requests carry a credential
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Client-side request rate
    pub fn requests_per_second(&self) -> u32 {
        self.pacer.per_second()
    }

    /// Build a GET request with the standard GitHub headers
    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .get(url)
            .header(ACCEPT, ACCEPT_HEADER)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, concat!("ghss/", env!("CARGO_PKG_VERSION")));

        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        req
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        self.pacer.until_ready().await;
        Ok(req.send().await.map_err(ApiError::from)?)
    }
}

/// Turn an error response into an `ApiError::Status`, preferring GitHub's
/// `{"message": ...}` body over the raw text.
async fn status_error(response: Response) -> ApiError {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.trim().to_string()
            }
        });

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Whether a 403 was caused by rate limiting rather than missing access.
///
/// GitHub marks rate limited 403s with `retry-after` or an exhausted
/// `x-ratelimit-remaining`; secondary limits may omit both. A 403 that still
/// reports remaining quota and no `retry-after` is a permission failure.
fn is_rate_limited_forbidden(headers: &RateLimitHeaders) -> bool {
    headers.retry_after.is_some() || !matches!(headers.remaining, Some(n) if n > 0)
}

/// Whether a `Link` header value contains a `rel="next"` entry.
fn has_next_link(link: &str) -> bool {
    link.split(',').any(|entry| {
        entry
            .split(';')
            .skip(1)
            .any(|param| param.trim() == "rel=\"next\"")
    })
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_org_repos_page(&self, org: &str, page: &PageRequest) -> Result<PageResponse> {
        let path = format!("/orgs/{}/repos", org);
        let mut req = self.get(&path).query(&page.to_query_params());
        if let Some(etag) = &page.etag {
            req = req.header(IF_NONE_MATCH, etag);
        }

        debug!("GET {} page {}", path, page.page);
        let response = self.send(req).await?;
        let status = response.status();

        match status {
            StatusCode::NOT_MODIFIED => Ok(PageResponse::NotModified),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                let hints = RateLimitHeaders::from_headers(response.headers());
                if status == StatusCode::FORBIDDEN && !is_rate_limited_forbidden(&hints) {
                    return Err(status_error(response).await.into());
                }
                Ok(PageResponse::Throttled(hints))
            }
            status if status.is_success() => {
                let etag = response
                    .headers()
                    .get(ETAG)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let has_next = response
                    .headers()
                    .get(LINK)
                    .and_then(|v| v.to_str().ok())
                    .map(has_next_link);

                let repos = response.json::<Vec<Repository>>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse repository page: {}", e))
                })?;

                Ok(PageResponse::Page {
                    etag,
                    repos,
                    has_next,
                })
            }
            _ => Err(status_error(response).await.into()),
        }
    }

    async fn rate_limit(&self) -> Result<RateLimitStatus> {
        let response = self.send(self.get("/rate_limit")).await?;

        if !response.status().is_success() {
            return Err(status_error(response).await.into());
        }

        let body = response.json::<RateLimitResponse>().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse rate limit response: {}", e))
        })?;

        Ok(body.rate)
    }
}
