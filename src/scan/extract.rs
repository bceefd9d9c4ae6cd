//! Projection of repository metadata to secret scanning status

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::client::Repository;

/// Written in place of a status GitHub did not disclose.
pub const MISSING_PERMISSIONS: &str = "Missing Perms";

/// Secret scanning status of one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    /// The value GitHub reported (`enabled`, `disabled`, ...)
    Reported(String),
    /// The caller lacks admin rights, so GitHub withheld the security block
    MissingPermissions,
}

impl ScanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ScanStatus::Reported(status) => status,
            ScanStatus::MissingPermissions => MISSING_PERMISSIONS,
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ScanStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Repository full name mapped to its secret scanning status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanResult {
    statuses: BTreeMap<String, ScanStatus>,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, full_name: &str) -> Option<&ScanStatus> {
        self.statuses.get(full_name)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScanStatus)> {
        self.statuses.iter()
    }

    /// Number of repositories whose status was withheld
    pub fn missing_permissions(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| **s == ScanStatus::MissingPermissions)
            .count()
    }

    /// Number of repositories reporting `status`
    #[cfg(test)]
    pub fn count_reported(&self, status: &str) -> usize {
        self.statuses
            .values()
            .filter(|s| matches!(s, ScanStatus::Reported(v) if v == status))
            .count()
    }
}

/// Extract the secret scanning status of every repository.
///
/// A missing or empty status at any level of
/// `security_and_analysis.secret_scanning.status` becomes
/// [`ScanStatus::MissingPermissions`].
pub fn extract(repos: &[Repository]) -> ScanResult {
    let statuses = repos
        .iter()
        .map(|repo| {
            let status = match repo.secret_scanning_status() {
                Some(value) if !value.is_empty() => ScanStatus::Reported(value.to_string()),
                _ => ScanStatus::MissingPermissions,
            };
            (repo.full_name.clone(), status)
        })
        .collect();

    ScanResult { statuses }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::{FeatureStatus, SecurityAndAnalysis};

    #[test]
    fn test_extract_reported_status() {
        let repos = vec![
            Repository::new("acme/a").with_secret_scanning("enabled"),
            Repository::new("acme/b").with_secret_scanning("disabled"),
        ];

        let result = extract(&repos);
        assert_eq!(result.len(), 2);
        assert_eq!(
            result.get("acme/a"),
            Some(&ScanStatus::Reported("enabled".to_string()))
        );
        assert_eq!(result.count_reported("disabled"), 1);
        assert_eq!(result.missing_permissions(), 0);
    }

    #[test]
    fn test_missing_segments_are_sentinel() {
        let no_block = Repository::new("acme/none");
        let empty_block = Repository {
            full_name: "acme/empty".to_string(),
            security_and_analysis: Some(SecurityAndAnalysis::default()),
        };
        let no_status = Repository {
            full_name: "acme/nostatus".to_string(),
            security_and_analysis: Some(SecurityAndAnalysis {
                secret_scanning: Some(FeatureStatus::default()),
            }),
        };
        let blank = Repository::new("acme/blank").with_secret_scanning("");

        let result = extract(&[no_block, empty_block, no_status, blank]);

        assert_eq!(result.len(), 4);
        assert_eq!(result.missing_permissions(), 4);
        for (_, status) in result.iter() {
            assert_eq!(status.as_str(), MISSING_PERMISSIONS);
        }
    }

    #[test]
    fn test_extract_empty() {
        let result = extract(&[]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let repos = vec![
            Repository::new("acme/a").with_secret_scanning("enabled"),
            Repository::new("acme/b"),
        ];

        let json = serde_json::to_value(extract(&repos)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "acme/a": "enabled",
                "acme/b": "Missing Perms",
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ScanStatus::MissingPermissions.to_string(), "Missing Perms");
        assert_eq!(ScanStatus::Reported("enabled".into()).to_string(), "enabled");
    }
}
