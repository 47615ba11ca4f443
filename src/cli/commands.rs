//! CLI commands and argument parsing

use crate::output::ExportFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable holding the research API access token
pub const TOKEN_ENV: &str = "RESEARCH_API_TOKEN";

/// Research API harvester CLI
#[derive(Parser, Debug)]
#[command(name = "research-harvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Access token
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Harvest every target and write snapshots and exports
    Fetch(FetchArgs),

    /// Load config and targets and compute windows, without any request
    Validate,

    /// List built-in datasets
    Endpoints,
}

/// Overrides for values in the run configuration
#[derive(Args, Debug, Default, Clone)]
pub struct FetchArgs {
    /// Built-in dataset to query
    #[arg(long)]
    pub dataset: Option<String>,

    /// Targets file (JSON or YAML)
    #[arg(long)]
    pub targets: Option<PathBuf>,

    /// Key the target mapping is nested under
    #[arg(long)]
    pub group: Option<String>,

    /// Calendar year to harvest
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub year: Option<i32>,

    /// Range start (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// Range end (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    pub end: Option<String>,

    /// Output root directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Tabular export format
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// Page cap per fetch
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Also write one export per target
    #[arg(long)]
    pub split_exports: bool,
}
