//! JSON-file backed ETag store
//!
//! The backing file is a flat JSON object keyed by organization name:
//!
//! ```json
//! { "acme": "W/\"5b2c...\"", "globex": null }
//! ```
//!
//! Non-string values are kept as-is so the same file can double as a target
//! list. All reads and writes go through one `EtagStore`; updates hold its
//! lock for the whole read-modify-write of the file.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::{ConfigError, Result};
use crate::output::write_json_file;

/// Per-organization ETag storage
pub struct EtagStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl EtagStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store; the file is created on the first
    /// update. A file that is not a JSON object is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            read_object(&path)?
        } else {
            debug!("ETag store {} does not exist yet", path.display());
            Map::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored ETag for `org`, if any
    pub async fn retrieve(&self, org: &str) -> Option<String> {
        self.entries
            .lock()
            .await
            .get(org)
            .and_then(Value::as_str)
            .filter(|etag| !etag.is_empty())
            .map(str::to_string)
    }

    /// Store `etag` for `org` and persist the file.
    ///
    /// The file is written on the blocking pool while the lock is held. The
    /// in-memory entry only changes once the write succeeded.
    pub async fn update(&self, org: &str, etag: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;

        let mut updated = entries.clone();
        updated.insert(org.to_string(), Value::String(etag.to_string()));

        let path = self.path.clone();
        let updated = tokio::task::spawn_blocking(move || {
            write_json_file(&path, &updated).map(|()| updated)
        })
        .await
        .map_err(|e| ConfigError::SaveError {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })??;

        *entries = updated;
        info!("Updated ETag for {}", org);
        Ok(())
    }
}

/// Read a file holding a single JSON object.
pub(crate) fn read_object(path: &Path) -> Result<Map<String, Value>> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value =
        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::ParseError {
            path: path.display().to_string(),
            message: format!("expected a JSON object, found {}", json_kind(&other)),
        }
        .into()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
