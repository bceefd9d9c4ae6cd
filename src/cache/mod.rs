//! Conditional-request cache
//!
//! Keeps the last ETag seen for each organization so the next run can ask
//! GitHub whether anything changed before paging through the listing again.

pub mod etag;

pub use etag::EtagStore;

/// Default ETag store file, relative to the working directory
pub const DEFAULT_ETAG_STORE: &str = "targets.json";
