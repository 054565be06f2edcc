//! Signal API tester - smoke tests for the trading-signal backend
//!
//! Exits with 0 when every counted check passed, 1 otherwise.

use std::path::PathBuf;

use clap::Parser;
use signal_api_tester::cli::{self, RunOptions};
use signal_api_tester::common::logging;

#[derive(Parser)]
#[command(name = "signal-api-tester", about = "Smoke-test the trading-signal backend API")]
#[command(version, long_about = None)]
struct Cli {
    /// Base URL of the deployment under test
    #[arg(long, env = "SIGNAL_API_BASE_URL")]
    base_url: Option<String>,

    /// Configuration file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let options = RunOptions {
        base_url: cli.base_url,
        config: cli.config,
        report: cli.report,
    };

    match cli::run(options).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
