//! Repository models from `GET /orgs/{org}/repos`

use serde::{Deserialize, Serialize};

/// Repository as returned by the organization listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`, unique across the listing
    pub full_name: String,

    /// Security feature settings.
    ///
    /// GitHub only includes this block for callers with admin rights on the
    /// repository (or owners/security managers of the organization).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_and_analysis: Option<SecurityAndAnalysis>,
}

impl Repository {
    /// Create a repository with no security block.
    #[cfg(test)]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            security_and_analysis: None,
        }
    }

    /// Attach a secret scanning status.
    #[cfg(test)]
    pub fn with_secret_scanning(mut self, status: impl Into<String>) -> Self {
        self.security_and_analysis = Some(SecurityAndAnalysis {
            secret_scanning: Some(FeatureStatus {
                status: Some(status.into()),
            }),
        });
        self
    }

    /// `security_and_analysis.secret_scanning.status`, if every segment is present.
    pub fn secret_scanning_status(&self) -> Option<&str> {
        self.security_and_analysis
            .as_ref()?
            .secret_scanning
            .as_ref()?
            .status
            .as_deref()
    }
}

/// The `security_and_analysis` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityAndAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_scanning: Option<FeatureStatus>,
}

/// A single feature toggle (`enabled` / `disabled`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
