//! Final tally and structured run report

use std::path::Path;

use serde::Serialize;

use crate::common::{ErrorReport, Result};

use super::probe::ProbeOutcome;
use super::tester::{CheckRecord, RunState};

/// Aggregate outcome of one run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub base_url: String,
    pub tests_run: usize,
    pub tests_passed: usize,
    pub success_rate: String,
    pub exit_code: i32,
    pub created_wallet_id: Option<String>,
    pub checks: Vec<CheckReport>,
    /// Not part of the tally
    pub realtime: Option<ProbeReport>,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub counted: bool,
    pub success: bool,
    pub status: Option<u16>,
    pub elapsed_ms: Option<u64>,
    pub error: Option<ErrorReport>,
}

impl From<&CheckRecord> for CheckReport {
    fn from(record: &CheckRecord) -> Self {
        Self {
            name: record.name.clone(),
            counted: record.counted,
            success: record.success,
            status: record.status,
            elapsed_ms: record.elapsed.map(|d| d.as_millis() as u64),
            error: record.error.as_ref().map(ErrorReport::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub url: String,
    pub connected: bool,
    pub error: Option<ErrorReport>,
}

impl From<&ProbeOutcome> for ProbeReport {
    fn from(outcome: &ProbeOutcome) -> Self {
        Self {
            url: outcome.url.clone(),
            connected: outcome.connected,
            error: outcome.error.as_ref().map(ErrorReport::from),
        }
    }
}

/// `100 * passed / run` with one decimal, or `0%` when nothing ran
pub fn success_rate(tests_run: usize, tests_passed: usize) -> String {
    if tests_run > 0 {
        format!("{:.1}%", tests_passed as f64 / tests_run as f64 * 100.0)
    } else {
        "0%".to_string()
    }
}

/// 0 when every counted check passed, 1 otherwise
pub fn exit_code(tests_run: usize, tests_passed: usize) -> i32 {
    if tests_passed == tests_run {
        0
    } else {
        1
    }
}

impl RunReport {
    pub fn new(base_url: &str, state: &RunState, probe: Option<&ProbeOutcome>) -> Self {
        Self {
            base_url: base_url.to_string(),
            tests_run: state.tests_run,
            tests_passed: state.tests_passed,
            success_rate: success_rate(state.tests_run, state.tests_passed),
            exit_code: exit_code(state.tests_run, state.tests_passed),
            created_wallet_id: state.created_wallet_id.clone(),
            checks: state.records.iter().map(CheckReport::from).collect(),
            realtime: probe.map(ProbeReport::from),
        }
    }

    pub fn tests_failed(&self) -> usize {
        self.tests_run.saturating_sub(self.tests_passed)
    }

    /// Find a check by name
    pub fn check(&self, name: &str) -> Option<&CheckReport> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("📊 FINAL RESULTS");
        println!("Tests Run: {}", self.tests_run);
        println!("Tests Passed: {}", self.tests_passed);
        println!("Success Rate: {}", self.success_rate);

        if self.exit_code == 0 {
            println!("🎉 ALL TESTS PASSED!");
        } else {
            println!("⚠️  {} tests failed", self.tests_failed());
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
