//! Paginated repository fetch with conditional requests and rate limit backoff
//!
//! One [`RepoFetcher::fetch`] call walks every page of an organization's
//! repository listing as an explicit state machine:
//!
//! ```text
//! RequestPage ──304 (page 1)──▶ NotModified ──▶ Unchanged
//!     │  ▲
//!     │  └── sleep ── Throttled ◀──403/429──┤
//!     │                  └── 10th backoff ──▶ Failed
//!     ├──other error──▶ Failed
//!     └──2xx──▶ PageReceived ──more pages──▶ RequestPage
//!                    └──last page──▶ Done ──▶ Complete
//! ```
//!
//! Pages are requested strictly in order and a failure on any page fails the
//! whole fetch; partial collections are never returned.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};

use crate::client::rate_limit::{RateLimitHeaders, check_rate_limits};
use crate::client::{GitHubApi, PageRequest, PageResponse, Repository};
use crate::error::{ApiError, Error, Result};

/// Consecutive exponential backoff steps allowed within one fetch.
pub const MAX_BACKOFF_RETRIES: u32 = 10;

/// Suspends the fetch loop while waiting out a rate limit.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Result of a completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The stored ETag still matches; nothing to do.
    Unchanged,

    /// Every page was fetched.
    Complete {
        /// ETag of page 1, to be stored once the result is persisted
        etag: Option<String>,
        /// All repositories in server order
        repos: Vec<Repository>,
    },
}

#[derive(Debug)]
enum State {
    RequestPage,
    Throttled(RateLimitHeaders),
    NotModified,
    PageReceived {
        etag: Option<String>,
        repos: Vec<Repository>,
        has_next: Option<bool>,
    },
    Done,
    Failed(Error),
}

/// Drives the page-by-page fetch for one organization.
pub struct RepoFetcher<'a> {
    client: &'a dyn GitHubApi,
    sleeper: &'a dyn Sleeper,
}

impl<'a> RepoFetcher<'a> {
    pub fn new(client: &'a dyn GitHubApi, sleeper: &'a dyn Sleeper) -> Self {
        Self { client, sleeper }
    }

    /// Fetch every repository of `org`.
    ///
    /// When `etag` is set it is sent as `If-None-Match` on every page; a 304
    /// on page 1 ends the fetch with [`FetchOutcome::Unchanged`].
    pub async fn fetch(&self, org: &str, etag: Option<String>) -> Result<FetchOutcome> {
        let mut request = PageRequest::first().with_etag(etag);
        let mut collected: Vec<Repository> = Vec::new();
        let mut first_page_etag: Option<String> = None;
        let mut backoff_retries: u32 = 0;
        let mut state = State::RequestPage;

        loop {
            state = match state {
                State::RequestPage => {
                    match self.client.list_org_repos_page(org, &request).await {
                        Ok(PageResponse::NotModified) if request.is_first() => State::NotModified,
                        Ok(PageResponse::NotModified) => State::Failed(
                            ApiError::InvalidResponse(format!(
                                "Unexpected 304 Not Modified on page {} for {}",
                                request.page, org
                            ))
                            .into(),
                        ),
                        Ok(PageResponse::Throttled(hints)) => State::Throttled(hints),
                        Ok(PageResponse::Page {
                            etag,
                            repos,
                            has_next,
                        }) => State::PageReceived {
                            etag,
                            repos,
                            has_next,
                        },
                        Err(e) => State::Failed(e),
                    }
                }

                State::Throttled(hints) => {
                    let decision =
                        check_rate_limits(&hints, backoff_retries + 1, Utc::now().timestamp());

                    if decision.exponential {
                        backoff_retries += 1;
                    }

                    if backoff_retries >= MAX_BACKOFF_RETRIES {
                        State::Failed(ApiError::BackoffExceeded(backoff_retries).into())
                    } else {
                        if decision.exponential {
                            warn!(
                                "{}: throttled without rate limit hints, backing off {}s (attempt {}/{})",
                                org,
                                decision.wait.as_secs(),
                                backoff_retries,
                                MAX_BACKOFF_RETRIES
                            );
                        } else {
                            warn!(
                                "{}: rate limited on page {}, waiting {}s",
                                org,
                                request.page,
                                decision.wait.as_secs()
                            );
                        }

                        if !decision.wait.is_zero() {
                            self.sleeper.sleep(decision.wait).await;
                        }
                        State::RequestPage
                    }
                }

                State::NotModified => {
                    debug!("{}: not modified since the stored ETag", org);
                    return Ok(FetchOutcome::Unchanged);
                }

                State::PageReceived {
                    etag,
                    repos,
                    has_next,
                } => {
                    if request.is_first() {
                        first_page_etag = etag;
                    }

                    debug!("{}: page {} returned {} repositories", org, request.page, repos.len());

                    if repos.is_empty() {
                        State::Done
                    } else {
                        let last = request.is_last(repos.len()) || has_next == Some(false);
                        collected.extend(repos);

                        if last {
                            State::Done
                        } else {
                            request = request.next();
                            State::RequestPage
                        }
                    }
                }

                State::Done => {
                    debug!("{}: fetched {} repositories", org, collected.len());
                    return Ok(FetchOutcome::Complete {
                        etag: first_page_etag,
                        repos: collected,
                    });
                }

                State::Failed(err) => return Err(err),
            };
        }
    }
}
