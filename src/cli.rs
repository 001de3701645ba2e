use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ApiTestConfig, Config};
use crate::runner::RunOptions;

/// Command line for the load driver.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "poll-loadtest",
    version,
    about = "Vote load generator and API test configuration for the cooperative service"
)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    /// Load profile TOML (defaults to config/default.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a subject and poll, then cast votes concurrently
    Run(RunArgs),
    /// Print the resolved API test configuration as JSON
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Target service; takes precedence over BASE_URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Concurrent virtual users
    #[arg(long)]
    pub vus: Option<u32>,

    /// Total vote iterations shared by all virtual users
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Pause between iterations of one virtual user, in milliseconds
    #[arg(long)]
    pub think_time_ms: Option<u64>,

    /// Fail the run when the check pass rate drops below this ratio
    #[arg(long)]
    pub checks_min_rate: Option<f64>,

    /// Read the poll's votes back after the run and compare counts
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay command line values on the loaded profile.
    pub fn apply(&self, config: &mut Config) {
        if let Some(vus) = self.vus {
            config.load.vus = vus;
        }
        if let Some(iterations) = self.iterations {
            config.load.iterations = iterations;
        }
        if let Some(ms) = self.think_time_ms {
            config.load.think_time_ms = ms;
        }
        if self.checks_min_rate.is_some() {
            config.thresholds.checks_min_rate = self.checks_min_rate;
        }
    }

    pub fn api_config(&self) -> ApiTestConfig {
        match &self.base_url {
            Some(url) => ApiTestConfig::resolve_from(Some(url.clone())),
            None => ApiTestConfig::resolve(),
        }
    }

    pub fn run_options(&self, config: &Config) -> RunOptions {
        RunOptions {
            verify: self.verify,
            ..RunOptions::from(&config.load)
        }
    }
}
