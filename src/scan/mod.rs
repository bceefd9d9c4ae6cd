//! Secret scanning status collection
//!
//! [`Scanner`] runs one target end to end: quota report, conditional fetch,
//! extraction, result file, then the ETag update. [`dispatch`] fans targets out over a
//! bounded pool.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use crate::cache::EtagStore;
use crate::client::GitHubApi;
use crate::error::Result;
use crate::output::write_scan_result;

pub mod dispatch;
pub mod extract;
pub mod fetch;

pub use dispatch::{DispatchSummary, TargetReport, dispatch_all};
pub use extract::{MISSING_PERMISSIONS, ScanResult, extract};
pub use fetch::{FetchOutcome, RepoFetcher, Sleeper, TokioSleeper};

/// What a single target scan did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanReport {
    /// Nothing changed since the stored ETag; no file was written
    Unchanged,

    /// A fresh result file was written
    Updated {
        /// Repositories in the result
        repos: usize,
        /// Repositories reported as missing permissions
        missing: usize,
        /// Location of the result file
        path: PathBuf,
    },
}

/// Scans targets against one client, ETag store, and output directory.
pub struct Scanner {
    client: Arc<dyn GitHubApi>,
    sleeper: Arc<dyn Sleeper>,
    etags: Arc<EtagStore>,
    output_dir: PathBuf,
}

impl Scanner {
    pub fn new(client: Arc<dyn GitHubApi>, etags: Arc<EtagStore>, output_dir: PathBuf) -> Self {
        Self {
            client,
            sleeper: Arc::new(TokioSleeper),
            etags,
            output_dir,
        }
    }

    /// Replace the sleeper used while rate limited.
    #[cfg(test)]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Scan one organization.
    ///
    /// `etag_override` replaces the stored ETag for this request only. The
    /// new ETag is stored after the result file has been written, so a failed
    /// write never suppresses the next scan.
    pub async fn scan_target(&self, org: &str, etag_override: Option<String>) -> Result<ScanReport> {
        let etag = match etag_override {
            Some(etag) => Some(etag),
            None => self.etags.retrieve(org).await,
        };

        log_rate_limit(self.client.as_ref(), org, "before scan").await;
        let fetcher = RepoFetcher::new(self.client.as_ref(), self.sleeper.as_ref());
        let outcome = fetcher.fetch(org, etag).await?;
        log_rate_limit(self.client.as_ref(), org, "after scan").await;

        match outcome {
            FetchOutcome::Unchanged => {
                info!("Nothing changed for {}", org);
                Ok(ScanReport::Unchanged)
            }
            FetchOutcome::Complete { etag, repos } => {
                let result = extract(&repos);
                if result.is_empty() {
                    warn!("{} has no repositories visible to this token", org);
                }
                let path = write_scan_result(&self.output_dir, org, &result)?;
                info!("Wrote {} repositories to {}", result.len(), path.display());

                match etag {
                    Some(etag) => self.etags.update(org, &etag).await?,
                    None => warn!("No ETag returned for {}; next scan will be unconditional", org),
                }

                Ok(ScanReport::Updated {
                    repos: result.len(),
                    missing: result.missing_permissions(),
                    path,
                })
            }
        }
    }
}

/// Log the current core quota. Failure only warns.
async fn log_rate_limit(client: &dyn GitHubApi, org: &str, when: &str) {
    match client.rate_limit().await {
        Ok(rate) => info!(
            "{}: rate limit {}: Limit {} Used {} Remaining {}",
            org, when, rate.limit, rate.used, rate.remaining
        ),
        Err(e) => warn!("{}: could not read rate limit {}: {}", org, when, e),
    }
}
