//! JSON output: per-target result files and the run summary

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::scan::ScanResult;

/// Wrapper for JSON summary output with metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    /// The actual data
    pub data: T,

    /// Metadata about the run
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Timestamp of the run
    pub timestamp: String,

    /// CLI version
    pub version: String,
}

impl<T> JsonOutput<T> {
    /// Create a new JSON output with metadata
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    let output = JsonOutput::new(data);
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Result file name for an organization
pub fn result_file_name(org: &str) -> String {
    format!("{}_status.json", org)
}

/// Write an organization's scan result to `<dir>/<org>_status.json`.
pub fn write_scan_result(dir: &Path, org: &str, result: &ScanResult) -> Result<PathBuf> {
    let path = dir.join(result_file_name(org));
    write_json_file(&path, result)?;
    Ok(path)
}

/// Pretty-print `value` to `path`, replacing the file in one rename.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let save_error = |message: String| ConfigError::SaveError {
        path: path.display().to_string(),
        message,
    };

    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');

    let file_name = path
        .file_name()
        .ok_or_else(|| save_error("not a file path".to_string()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, contents).map_err(|e| save_error(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| save_error(e.to_string()))?;

    Ok(())
}
