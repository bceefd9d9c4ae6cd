//! Global CLI options shared by single and list mode
//!
//! # Precedence
//!
//! For most options, the precedence is: CLI flag > environment variable >
//! config file > default. This struct captures the CLI/env layer; config file
//! values are merged in `CommandContext`.

use crate::cli::{Cli, OutputFormat};

/// Options that shape the scan context, independent of the target.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Summary output format
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.ghss/config.yaml)
    pub config: Option<String>,

    /// Token from `--token`
    pub token: Option<String>,

    /// API base URL override
    pub api_url: Option<String>,

    /// ETag store override
    pub etag_store: Option<String>,

    /// Result directory override
    pub output: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            token: cli.token.clone(),
            api_url: cli.api_url.clone(),
            etag_store: cli.etag_store.clone(),
            output: cli.output.clone(),
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get token flag as `Option<&str>`.
    pub fn token_ref(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
