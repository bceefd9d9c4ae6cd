//! Configuration management for ghss
//!
//! Settings resolve with the precedence CLI flag > environment variable >
//! config file > default. The config file is optional YAML, by default at
//! `~/.ghss/config.yaml`:
//!
//! ```yaml
//! token: ghp_xxx
//! api_url: https://github.example.com/api/v3
//! etag_store: /var/lib/ghss/targets.json
//! output_dir: /var/lib/ghss/results
//! requests_per_second: 5
//! ```

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub mod targets;

pub use targets::{is_target_list, load_targets, validate_target};

/// Environment variable holding the GitHub token
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Application configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// GitHub token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// API base URL (GitHub Enterprise)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// ETag store location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag_store: Option<PathBuf>,

    /// Directory for `<org>_status.json` files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Client-side request pacing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".ghss").join("config.yaml"))
    }

    /// Load configuration from an explicit path, or the default location.
    ///
    /// An explicit path must exist. The default location is optional and
    /// yields an empty config when absent.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(Path::new(p)),
            None => match Self::default_path() {
                Ok(p) if p.exists() => Self::load_from(&p),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Resolve the GitHub token: explicit flag, then `GITHUB_TOKEN`, then the
/// config file. Absence is allowed but limits anonymous access to 60
/// requests per hour, so it is logged as a warning.
pub fn resolve_token(
    flag: Option<&str>,
    env: Option<String>,
    config: &Config,
) -> Option<String> {
    let token = flag
        .map(str::to_string)
        .or(env)
        .or_else(|| config.token.clone())
        .filter(|t| !t.trim().is_empty());

    if token.is_none() {
        warn!("No token provided: request rate limit will be 60/h.");
    }

    token
}

/// `GITHUB_TOKEN` from the environment, if set
pub fn token_from_env() -> Option<String> {
    std::env::var(TOKEN_ENV_VAR).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.token.is_none());
        assert!(config.api_url.is_none());
        assert!(config.etag_store.is_none());
        assert!(config.output_dir.is_none());
        assert!(config.requests_per_second.is_none());
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "token: ghp_file\napi_url: http://localhost:9000\netag_store: /tmp/etags.json\nrequests_per_second: 3\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.token.as_deref(), Some("ghp_file"));
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.etag_store, Some(PathBuf::from("/tmp/etags.json")));
        assert_eq!(config.output_dir, None);
        assert_eq!(config.requests_per_second, Some(3));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "\n").unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.yaml");

        let err = Config::load_at(Some(path.to_str().unwrap())).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "token: [unclosed").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_resolve_token_precedence() {
        let config = Config {
            token: Some("from-config".to_string()),
            ..Default::default()
        };

        assert_eq!(
            resolve_token(Some("from-flag"), Some("from-env".to_string()), &config).as_deref(),
            Some("from-flag")
        );
        assert_eq!(
            resolve_token(None, Some("from-env".to_string()), &config).as_deref(),
            Some("from-env")
        );
        assert_eq!(resolve_token(None, None, &config).as_deref(), Some("from-config"));
    }

    #[test]
    fn test_resolve_token_absent() {
        assert_eq!(resolve_token(None, None, &Config::default()), None);
        assert_eq!(resolve_token(Some("  "), None, &Config::default()), None);
    }
}
