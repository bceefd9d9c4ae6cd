//! Common CLI types

/// Output format for the run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - colored messages and a summary table
    #[default]
    Pretty,
    /// JSON format - structured for scripts
    Json,
}
