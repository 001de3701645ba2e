use anyhow::{Context, Result};
use clap::Parser;
use poll_loadtest::cli::{Cli, Command, RunArgs};
use poll_loadtest::report::THRESHOLD_EXIT_CODE;
use poll_loadtest::{telemetry, ApiTestConfig, Config, HttpPollsApi, LoadTest, LoadTestError};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json);

    match &cli.command {
        Command::Config => {
            let cfg = ApiTestConfig::resolve();
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            Ok(())
        }
        Command::Run(args) => run(&cli, args).await,
    }
}

async fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading load profile")?;
    args.apply(&mut config);
    config.validate().context("validating load profile")?;

    let api_cfg = args.api_config();
    let api = HttpPollsApi::new(&api_cfg).context("building HTTP client")?;
    info!(
        base_url = %api.base_url(),
        vus = config.load.vus,
        iterations = config.load.iterations,
        "starting vote load test"
    );

    let load_test = LoadTest::new(Arc::new(api), args.run_options(&config));
    let cancel = telemetry::cancel_on_shutdown();
    let summary = match load_test.run(cancel).await {
        Ok(summary) => summary,
        Err(LoadTestError::Cancelled) => {
            warn!("cancelled during setup, no votes were cast");
            return Ok(());
        }
        Err(e) => {
            error!(
                error = %e,
                rejected = e.is_rejection(),
                "setup failed, no votes were cast"
            );
            return Err(e).context("load test setup");
        }
    };

    summary.print();
    if let Some(path) = &args.out {
        summary.write_json(path)?;
        println!("  JSON report: {}", path.display());
    }

    if summary.threshold_crossed(config.thresholds.checks_min_rate) {
        warn!(
            check_rate = summary.check_rate,
            min = ?config.thresholds.checks_min_rate,
            "check threshold crossed"
        );
        std::process::exit(THRESHOLD_EXIT_CODE);
    }
    Ok(())
}
