//! `soos-scan` — pipeline task that uploads dependency manifests to SOOS and
//! starts a security and license analysis.
//!
//! # Flow
//! 1. Read task inputs ([`cli`]) and the optional config file ([`config::load_config`]).
//! 2. Resolve and validate parameters ([`config::TaskParameters::resolve`]).
//! 3. Create the scan, fetch supported manifest patterns ([`api`]).
//! 4. Find manifests under the source path ([`discovery`]).
//! 5. Upload them concurrently and start the scan ([`scan`]).
//! 6. Optionally poll until the scan finishes ([`scan::wait_for_scan`]).
//! 7. Print the outcome ([`report`]); exit `1` and mark the task failed on any error.

mod api;
mod cli;
mod config;
mod discovery;
mod error;
mod models;
mod report;
mod scan;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use api::ApiClient;
use cli::Cli;
use config::{load_config, TaskParameters};
use models::ScanOutcome;
use scan::{run_scan, scan_name, scan_request, ScanOptions};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(outcome) => {
            report::terminal::render_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Task Failed. {e:#}");
            report::pipeline::set_failed(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` takes precedence.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("soos_scan={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> Result<ScanOutcome> {
    let path = cli.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = load_config(&path, cli.config.as_deref())?;
    let params = TaskParameters::resolve(cli, config)?;

    debug!("--- TASK PARAMETERS -----------");
    debug!("{params:#?}");
    debug!("--- TASK PARAMETERS -----------");

    report::terminal::render_banner(&params.project, &params.path);

    let api = ApiClient::new(&params.base_uri, &params.api_key, &params.client_id)?;
    let request = scan_request(&params, scan_name());
    let outcome = run_scan(&api, &request, &ScanOptions::from(&params)).await?;

    Ok(outcome)
}
