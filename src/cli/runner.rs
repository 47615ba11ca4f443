//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FetchArgs};
use crate::cli::harvest::Harvest;
use crate::config::{RunConfig, TargetSource};
use crate::endpoint::list_builtin;
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClient;
use chrono::Local;
use serde_json::{json, Value};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch(args) => self.fetch(args).await,
            Commands::Validate => self.validate(),
            Commands::Endpoints => self.list_endpoints(),
        }
    }

    /// Load the run config and apply command-line overrides
    pub fn load_config(&self, args: Option<&FetchArgs>) -> Result<RunConfig> {
        let mut config = match &self.cli.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };

        if let Some(args) = args {
            apply_overrides(&mut config, args);
            config.validate()?;
        }

        Ok(config)
    }

    /// Access token from `--token` or the environment
    fn token(&self) -> Result<&str> {
        self.cli
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::missing_field("access token (--token or RESEARCH_API_TOKEN)"))
    }

    /// Harvest every target
    async fn fetch(&self, args: &FetchArgs) -> Result<()> {
        let config = self.load_config(Some(args))?;
        let token = self.token()?;
        let targets = config.load_targets()?;

        let client = HttpClient::new(config.http_client_config())
            .context("Failed to build HTTP client")?
            .with_token(token);
        let harvest = Harvest::from_config(client, &config, Local::now().date_naive())?;

        info!(
            "Harvesting {} for {} targets into {}",
            config.dataset,
            targets.len(),
            harvest.layout().root().display()
        );
        let summary = harvest.run(&targets).await;

        self.output_message(&json!({
            "type": "RUN_SUMMARY",
            "summary": summary
        }));

        Ok(())
    }

    /// Validate config and targets without touching the network
    fn validate(&self) -> Result<()> {
        let config = self.load_config(None)?;
        let endpoint = config.endpoint()?;
        let windows = config.windows(&endpoint, Local::now().date_naive())?;
        let targets = config.load_targets()?;

        self.output_message(&json!({
            "type": "VALID",
            "dataset": endpoint.name,
            "url": endpoint.request_url()?.to_string(),
            "targets": targets.iter().map(|t| t.username.as_str()).collect::<Vec<_>>(),
            "windows": windows.map(|ws| ws.iter().map(ToString::to_string).collect::<Vec<_>>()),
            "output_dir": config.output_dir,
            "format": config.format
        }));

        Ok(())
    }

    /// List built-in datasets
    fn list_endpoints(&self) -> Result<()> {
        let endpoints: Vec<Value> = list_builtin()
            .into_iter()
            .map(|endpoint| {
                json!({
                    "name": endpoint.name,
                    "url": endpoint.url,
                    "fields": endpoint.fields,
                    "page_size": endpoint.page_size,
                    "windowed": endpoint.windowed
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "ENDPOINTS",
            "endpoints": endpoints
        }));

        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        if self.cli.verbose {
            match serde_json::to_string_pretty(msg) {
                Ok(s) => println!("{s}"),
                Err(_) => println!("{msg}"),
            }
        } else {
            println!("{msg}");
        }
    }
}

/// Command-line values win over file values
pub fn apply_overrides(config: &mut RunConfig, args: &FetchArgs) {
    if let Some(dataset) = &args.dataset {
        config.dataset.clone_from(dataset);
    }
    if let Some(targets) = &args.targets {
        config.targets = Some(TargetSource::File(targets.clone()));
    }
    if let Some(group) = &args.group {
        config.group = Some(group.clone());
    }
    if let Some(year) = args.year {
        config.year = Some(year);
        config.start = None;
        config.end = None;
    }
    if args.start.is_some() || args.end.is_some() {
        config.year = None;
        config.start.clone_from(&args.start);
        config.end.clone_from(&args.end);
    }
    if let Some(output) = &args.output {
        config.output_dir.clone_from(output);
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(max_pages) = args.max_pages {
        config.fetch.max_pages = max_pages;
    }
    if args.split_exports {
        config.split_exports = true;
    }
}
