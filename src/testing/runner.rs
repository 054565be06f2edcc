//! Test runner implementation
//!
//! Executes the procedures strictly in order, each behind a guard that turns
//! returned errors and panics into a logged incident, then runs the realtime
//! probe and prints the tally.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use colored::Colorize;
use futures_util::FutureExt;
use tracing::{debug, error};

use crate::common::Error;

use super::probe::{realtime_url, spawn_probe};
use super::procedures::Procedure;
use super::report::RunReport;
use super::tester::ApiTester;

/// A named procedure in the run sequence
pub struct TestCase {
    pub name: String,
    pub procedure: Box<dyn Procedure>,
}

impl TestCase {
    pub fn new(name: &str, procedure: impl Procedure + 'static) -> Self {
        Self {
            name: name.to_string(),
            procedure: Box::new(procedure),
        }
    }
}

/// Run every case in order, then the realtime probe, and print the summary
pub async fn run_suite(mut tester: ApiTester, cases: &[TestCase]) -> RunReport {
    println!("🚀 Starting Polymarket Trading Bot API Tests");
    println!("{}", "=".repeat(60));

    for case in cases {
        run_guarded(&mut tester, case).await;
    }

    let url = realtime_url(&tester.config().base_url, &tester.config().realtime);
    let probe = spawn_probe(url, tester.config().timeouts.probe()).await;

    let base_url = tester.config().base_url.clone();
    let state = tester.into_state();
    let report = RunReport::new(&base_url, &state, Some(&probe));
    report.print_summary();
    report
}

async fn run_guarded(tester: &mut ApiTester, case: &TestCase) {
    debug!(case = %case.name, "Running procedure");

    let outcome = AssertUnwindSafe(case.procedure.run(tester))
        .catch_unwind()
        .await;

    let incident = match outcome {
        Ok(Ok(passed)) => {
            debug!(case = %case.name, passed, "Procedure finished");
            return;
        }
        Ok(Err(e)) => e,
        Err(panic) => Error::Panicked(panic_message(panic.as_ref())),
    };

    error!(case = %case.name, error = %incident, "Procedure aborted");
    println!(
        "❌ {} in {}: {}",
        "CRITICAL ERROR".red().bold(),
        case.name,
        incident
    );
    tester.record_uncounted(&case.name, incident);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
