//! API test runner
//!
//! Drives a fixed sequence of REST checks against the trading-signal
//! backend through a shared request helper, probes the realtime endpoint,
//! and tallies the results.

mod probe;
mod procedures;
mod report;
mod runner;
mod tester;

pub use probe::{check_realtime, realtime_url, spawn_probe, ProbeOutcome};
pub use procedures::{default_suite, Builtin, Procedure};
pub use report::{exit_code, success_rate, CheckReport, ProbeReport, RunReport};
pub use runner::{run_suite, TestCase};
pub use tester::{ApiTester, Check, CheckRecord, RunState, TestResult};
