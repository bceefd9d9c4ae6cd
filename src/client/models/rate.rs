//! Rate limit status from `GET /rate_limit`

use serde::{Deserialize, Serialize};

/// Response body of `GET /rate_limit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResponse {
    /// Core REST API quota
    pub rate: RateLimitStatus,
}

/// Quota counters for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: u64,
    #[serde(default)]
    pub used: u64,
    pub remaining: u64,
    /// Unix timestamp when the window resets
    #[serde(default)]
    pub reset: i64,
}
