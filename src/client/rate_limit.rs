//! Rate limit handling for the GitHub REST API
//!
//! Two halves live here:
//! - [`check_rate_limits`] decides how long to wait after a throttled (403/429)
//!   response, following GitHub's documented precedence of `retry-after`, then
//!   `x-ratelimit-remaining`/`x-ratelimit-reset`, then exponential backoff.
//! - [`RequestPacer`] paces outgoing requests on the client side so a burst of
//!   workers does not trip the secondary rate limits in the first place.
//!
//! See <https://docs.github.com/en/rest/using-the-rest-api/rate-limits-for-the-rest-api#exceeding-the-rate-limit>

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::header::HeaderMap;

/// Base wait for the first exponential backoff step.
pub const BACKOFF_BASE_SECS: u64 = 60;

/// Default client-side request rate.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// The rate limit hints carried by a throttled response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// `retry-after` in seconds
    pub retry_after: Option<u64>,
    /// `x-ratelimit-remaining`
    pub remaining: Option<u64>,
    /// `x-ratelimit-reset` as a Unix timestamp
    pub reset: Option<i64>,
}

impl RateLimitHeaders {
    /// Extract the rate limit hints from a response header map.
    ///
    /// Values that are present but not valid integers are treated as absent.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        fn parse<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<T>().ok())
        }

        Self {
            retry_after: parse(headers, "retry-after"),
            remaining: parse(headers, "x-ratelimit-remaining"),
            reset: parse(headers, "x-ratelimit-reset"),
        }
    }
}

/// What to do after a throttled response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitDecision {
    /// The server gave no usable hint and we are guessing with exponential backoff
    pub exponential: bool,
    /// How long to sleep before retrying
    pub wait: Duration,
}

impl WaitDecision {
    fn hinted(secs: u64) -> Self {
        Self {
            exponential: false,
            wait: Duration::from_secs(secs),
        }
    }
}

/// Decide how long to wait after a throttled response.
///
/// `attempt` is the 1-based number of the exponential backoff step this
/// response would be if no hint is present; `now` is the current Unix time.
/// Rules, highest priority first:
///
/// 1. `retry-after: N` waits exactly `N` seconds.
/// 2. `x-ratelimit-remaining > 0` needs no wait.
/// 3. `x-ratelimit-remaining == 0` waits until one second past
///    `x-ratelimit-reset`, never less than zero.
/// 4. Anything else backs off for `60 * 2^(attempt - 1)` seconds.
pub fn check_rate_limits(headers: &RateLimitHeaders, attempt: u32, now: i64) -> WaitDecision {
    if let Some(secs) = headers.retry_after {
        return WaitDecision::hinted(secs);
    }

    match (headers.remaining, headers.reset) {
        (Some(remaining), _) if remaining > 0 => return WaitDecision::hinted(0),
        (Some(_), Some(reset)) => {
            let delta = reset.saturating_sub(now).saturating_add(1).max(0);
            return WaitDecision::hinted(delta as u64);
        }
        // Quota exhausted but no reset time: no better information than the
        // anomalous case below.
        _ => {}
    }

    let exponent = attempt.max(1) - 1;
    WaitDecision {
        exponential: true,
        wait: Duration::from_secs(BACKOFF_BASE_SECS.saturating_mul(2u64.saturating_pow(exponent))),
    }
}

/// Client-side request pacing shared by every worker using one client.
pub struct RequestPacer {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    per_second: u32,
}

impl RequestPacer {
    /// Create a pacer allowing `per_second` requests per second.
    ///
    /// A rate of zero is clamped to one.
    pub fn new(per_second: u32) -> Self {
        let rate = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::direct(Quota::per_second(rate)),
            per_second: rate.get(),
        }
    }

    /// Requests per second this pacer allows.
    pub fn per_second(&self) -> u32 {
        self.per_second
    }

    /// Wait until the next request may be sent.
    pub async fn until_ready(&self) {
        if self.limiter.check().is_err() {
            debug!("Pacing requests at {}/s", self.per_second);
            self.limiter.until_ready().await;
        }
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_SECOND)
    }
}
