//! Signal API tester - smoke tests for the trading-signal backend
//!
//! Runs a fixed sequence of REST checks (health, prices, wallets, AI
//! signals) plus a realtime WebSocket probe against a deployment and
//! reports pass/fail counts.

pub mod cli;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::config::Config;
pub use common::{Error, Result};
