//! CLI definition and handlers

use clap::Parser;

pub mod args;
pub mod context;
pub mod scan;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// ghss - secret scanning status poller for GitHub organizations
#[derive(Parser, Debug)]
#[command(name = "ghss")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Organization to scan, or a JSON file whose keys are organizations
    pub target: String,

    /// GitHub token (falls back to GITHUB_TOKEN, then the config file)
    #[arg(short, long)]
    pub token: Option<String>,

    /// Directory for <org>_status.json result files
    #[arg(short, long, env = "GHSS_OUTPUT_DIR", hide_env = true)]
    pub output: Option<String>,

    /// Look for changes within this many hours (logged only)
    #[arg(short = 'd', long, value_name = "HOURS")]
    pub diff_timeframe: Option<u32>,

    /// ETag to send instead of the stored one (single organization only)
    #[arg(short, long)]
    pub etag: Option<String>,

    /// ETag store location
    #[arg(long, env = "GHSS_ETAG_STORE", hide_env = true)]
    pub etag_store: Option<String>,

    /// Override config file location
    #[arg(long, env = "GHSS_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GHSS_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Output format for the run summary (pretty, json)
    #[arg(
        long,
        env = "GHSS_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long, env = "GHSS_DEBUG", hide_env = true)]
    pub debug: bool,
}
