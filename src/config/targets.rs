//! Target list loading
//!
//! A target list is a JSON object whose keys are organization names. The
//! values are ignored, which lets the ETag store file serve as the list.

use std::path::Path;

use crate::cache::etag::read_object;
use crate::error::{ConfigError, Result};

/// Characters that would escape the output directory or the request path
const FORBIDDEN: &[char] = &['/', '\\', '?', '#'];

/// Whether a positional argument names a target list rather than an org
pub fn is_target_list(arg: &str) -> bool {
    arg.ends_with(".json")
}

/// Check that `name` can be used as an organization in a URL path segment
/// and in a result file name.
pub fn validate_target(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("must not be empty")
    } else if name.contains(FORBIDDEN) {
        Some("must not contain '/', '\\', '?' or '#'")
    } else if name.contains("..") {
        Some("must not contain '..'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::Invalid(format!(
            "organization name {:?} {}",
            name, reason
        ))
        .into()),
        None => Ok(()),
    }
}

/// Load organization names from a target list file, in file order.
///
/// Any invalid name rejects the whole file.
pub fn load_targets(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()).into());
    }

    read_object(path)?
        .into_iter()
        .map(|(name, _)| validate_target(&name).map(|()| name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn test_is_target_list() {
        assert!(is_target_list("orgs.json"));
        assert!(is_target_list("/etc/ghss/targets.json"));
        assert!(!is_target_list("acme"));
        assert!(!is_target_list("json"));
    }

    #[test]
    fn test_load_targets_keeps_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("targets.json");
        std::fs::write(&path, r#"{"zeta": "\"etag\"", "alpha": null, "mid-org": null}"#).unwrap();

        let targets = load_targets(&path).unwrap();
        assert_eq!(targets, vec!["zeta", "alpha", "mid-org"]);
    }

    #[test]
    fn test_load_targets_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_targets(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_targets_not_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("targets.json");
        std::fs::write(&path, r#""acme""#).unwrap();

        let err = load_targets(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_targets_rejects_traversal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("targets.json");
        std::fs::write(&path, r#"{"acme": null, "../x": null}"#).unwrap();

        let err = load_targets(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
        assert!(err.to_string().contains("../x"));
    }

    #[test]
    fn test_load_targets_rejects_empty_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("targets.json");
        std::fs::write(&path, r#"{"": null}"#).unwrap();

        let err = load_targets(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_target() {
        assert!(validate_target("acme").is_ok());
        assert!(validate_target("acme-corp.io").is_ok());

        for bad in ["", "  ", "a/b", "..", "a..b", "a?b", "a#b", "a\\b"] {
            assert!(validate_target(bad).is_err(), "{:?} should be rejected", bad);
        }
    }
}
