//! Error types for ghss

use thiserror::Error;

/// Result type alias for ghss operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while talking to the GitHub API.
///
/// `Network`, `Status` and `InvalidResponse` abort a fetch immediately.
/// `BackoffExceeded` is raised by the fetch loop once the server keeps
/// throttling without telling us how long to wait.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Exponential backoff gave up after {0} consecutive throttled responses")]
    BackoffExceeded(u32),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Errors from local configuration and on-disk stores
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save {path}: {message}")]
    SaveError { path: String, message: String },
}
