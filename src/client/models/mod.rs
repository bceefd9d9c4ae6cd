//! GitHub API data models
//!
//! Only the fields ghss reads are modeled; everything else in the payloads
//! is ignored by serde.

mod rate;
mod repo;

pub use rate::{RateLimitResponse, RateLimitStatus};
pub use repo::Repository;
#[cfg(test)]
pub use repo::{FeatureStatus, SecurityAndAnalysis};
