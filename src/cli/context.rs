//! Command execution context
//!
//! Merges CLI options with the config file and builds the shared client,
//! ETag store, and scanner once per run.

use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::cache::{DEFAULT_ETAG_STORE, EtagStore};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::GitHubClient;
use crate::client::rate_limit::DEFAULT_REQUESTS_PER_SECOND;
use crate::config::{self, Config};
use crate::error::Result;
use crate::scan::Scanner;

/// Context for command execution containing the scanner and runtime options.
pub struct CommandContext {
    /// Scanner wired to the client, ETag store, and output directory
    pub scanner: Scanner,
    /// Summary output format
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// # Errors
    /// Returns error if the config file or ETag store cannot be read, or the
    /// output directory cannot be created.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?;

        let token = config::resolve_token(opts.token_ref(), config::token_from_env(), &config);
        let mut client = GitHubClient::new(token)?.with_requests_per_second(
            config
                .requests_per_second
                .unwrap_or(DEFAULT_REQUESTS_PER_SECOND),
        );
        if let Some(url) = opts.api_url.clone().or_else(|| config.api_url.clone()) {
            debug!("Using API at {}", url);
            client = client.with_base_url(url);
        }
        debug!(
            "Client authenticated: {}, pacing at {}/s",
            client.is_authenticated(),
            client.requests_per_second()
        );

        let etag_path = opts
            .etag_store
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| config.etag_store.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ETAG_STORE));
        let etags = EtagStore::open(etag_path)?;
        debug!("ETag store at {}", etags.path().display());

        let output_dir = opts
            .output
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| config.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&output_dir)?;

        let scanner = Scanner::new(Arc::new(client), Arc::new(etags), output_dir);

        Ok(Self {
            scanner,
            format: opts.format,
        })
    }
}
