//! Bounded concurrent dispatch over many targets
//!
//! At most [`MAX_CONCURRENT_SCANS`] targets are in flight. A failing target
//! is logged and recorded; the others carry on.

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, error};
use serde::Serialize;

use super::{ScanReport, Scanner};

/// Maximum number of targets scanned at once
pub const MAX_CONCURRENT_SCANS: usize = 3;

type ScanFuture<'a> = Pin<Box<dyn Future<Output = TargetReport> + Send + 'a>>;

/// Final state of one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetStatus {
    Unchanged,
    Updated {
        repos: usize,
        missing_permissions: usize,
        path: PathBuf,
    },
    Failed {
        error: String,
    },
}

/// Outcome of one target within a dispatch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub target: String,
    #[serde(flatten)]
    pub status: TargetStatus,
}

/// Per-target outcomes of a dispatch run, in completion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchSummary {
    pub targets: Vec<TargetReport>,
}

impl DispatchSummary {
    pub fn failed(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| matches!(t.status, TargetStatus::Failed { .. }))
            .count()
    }

    pub fn updated(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| matches!(t.status, TargetStatus::Updated { .. }))
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.status == TargetStatus::Unchanged)
            .count()
    }
}

impl From<ScanReport> for TargetStatus {
    fn from(report: ScanReport) -> Self {
        match report {
            ScanReport::Unchanged => TargetStatus::Unchanged,
            ScanReport::Updated {
                repos,
                missing,
                path,
            } => TargetStatus::Updated {
                repos,
                missing_permissions: missing,
                path,
            },
        }
    }
}

async fn scan_one(scanner: &Scanner, target: String) -> TargetReport {
    let status = match scanner.scan_target(&target, None).await {
        Ok(report) => report.into(),
        Err(e) => {
            error!("Scan of {} failed: {}", target, e);
            TargetStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    TargetReport { target, status }
}

/// Scan every target with at most [`MAX_CONCURRENT_SCANS`] in flight.
///
/// Duplicate names are scanned once. Returns when every target has finished.
pub async fn dispatch_all(scanner: &Scanner, targets: Vec<String>) -> DispatchSummary {
    let mut seen = HashSet::new();
    let mut pending = targets
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect::<Vec<_>>()
        .into_iter();

    debug!(
        "Dispatching {} targets with max {} concurrent",
        pending.len(),
        MAX_CONCURRENT_SCANS
    );

    let mut summary = DispatchSummary::default();
    let mut futures: FuturesUnordered<ScanFuture<'_>> = FuturesUnordered::new();

    for target in pending.by_ref().take(MAX_CONCURRENT_SCANS) {
        debug!("Starting scan of {}", target);
        futures.push(Box::pin(scan_one(scanner, target)));
    }

    while let Some(report) = futures.next().await {
        debug!("Finished scan of {}", report.target);
        summary.targets.push(report);

        if let Some(next) = pending.next() {
            debug!("Starting scan of {}", next);
            futures.push(Box::pin(scan_one(scanner, next)));
        }
    }

    summary
}
