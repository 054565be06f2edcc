//! CLI entry point
//!
//! Resolves configuration, builds the tester and runs the fixed suite.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::common::config::Config;
use crate::common::Result;
use crate::testing::{default_suite, run_suite, ApiTester};

/// Options collected from the command line
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Overrides the configured base URL
    pub base_url: Option<String>,
    /// Explicit configuration file; the platform default is used otherwise
    pub config: Option<PathBuf>,
    /// Where to write the JSON report
    pub report: Option<PathBuf>,
}

/// Run the suite and return the process exit code
pub async fn run(options: RunOptions) -> Result<i32> {
    let mut config = match &options.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(base_url) = &options.base_url {
        config = config.with_base_url(base_url);
    }
    info!(base_url = %config.base_url, "Testing deployment");

    let tester = ApiTester::new(config)?;
    let report = run_suite(tester, &default_suite()).await;

    if let Some(path) = &options.report {
        report.write_json(path)?;
        debug!(path = %path.display(), "Wrote JSON report");
    }

    Ok(report.exit_code)
}
