//! Scan target display model

use serde::Serialize;
use tabled::Tabled;

use crate::scan::dispatch::{TargetReport, TargetStatus};

/// One row of the run summary table.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TargetDisplay {
    /// Organization name
    #[tabled(rename = "ORG")]
    pub org: String,

    /// updated / unchanged / failed
    #[tabled(rename = "STATUS")]
    pub status: String,

    /// Repositories written
    #[tabled(rename = "REPOS")]
    pub repos: String,

    /// Repositories without a visible status
    #[tabled(rename = "MISSING PERMS")]
    pub missing: String,

    /// Result file, or the error for failed targets
    #[tabled(rename = "DETAIL")]
    pub detail: String,
}

impl From<&TargetReport> for TargetDisplay {
    fn from(report: &TargetReport) -> Self {
        let (status, repos, missing, detail) = match &report.status {
            TargetStatus::Unchanged => ("unchanged", "--".to_string(), "--".to_string(), String::new()),
            TargetStatus::Updated {
                repos,
                missing_permissions,
                path,
            } => (
                "updated",
                repos.to_string(),
                missing_permissions.to_string(),
                path.display().to_string(),
            ),
            TargetStatus::Failed { error } => {
                ("failed", "--".to_string(), "--".to_string(), error.clone())
            }
        };

        Self {
            org: report.target.clone(),
            status: status.to_string(),
            repos,
            missing,
            detail,
        }
    }
}
