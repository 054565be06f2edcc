//! Built-in checks against the trading-signal backend
//!
//! Each procedure wraps one call to the request helper and echoes a few
//! fields of the response. Only the status code is asserted.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::common::{truncate_chars, Result};

use super::runner::TestCase;
use super::tester::{ApiTester, Check};

/// A named step of the run
#[async_trait]
pub trait Procedure: Send + Sync {
    /// Run the step; `Ok(false)` is an ordinary failure or skip
    async fn run(&self, tester: &mut ApiTester) -> Result<bool>;
}

/// The checks shipped with the tester
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    HealthCheck,
    ApiHealth,
    CurrentPrices,
    AddWallet,
    GetWallets,
    GenerateSignal,
    GetSignals,
    WalletPositions,
    WalletActivity,
    DeleteWallet,
}

#[async_trait]
impl Procedure for Builtin {
    async fn run(&self, tester: &mut ApiTester) -> Result<bool> {
        let success = match self {
            Builtin::HealthCheck => health_check(tester).await,
            Builtin::ApiHealth => api_health(tester).await,
            Builtin::CurrentPrices => current_prices(tester).await,
            Builtin::AddWallet => add_wallet(tester).await,
            Builtin::GetWallets => get_wallets(tester).await,
            Builtin::GenerateSignal => generate_signal(tester).await,
            Builtin::GetSignals => get_signals(tester).await,
            Builtin::WalletPositions => wallet_positions(tester).await,
            Builtin::WalletActivity => wallet_activity(tester).await,
            Builtin::DeleteWallet => delete_wallet(tester).await,
        };
        Ok(success)
    }
}

/// The full sequence, in dependency order
pub fn default_suite() -> Vec<TestCase> {
    vec![
        TestCase::new("Basic Health Check", Builtin::HealthCheck),
        TestCase::new("API Health Status", Builtin::ApiHealth),
        TestCase::new("Current Prices", Builtin::CurrentPrices),
        TestCase::new("Add Wallet", Builtin::AddWallet),
        TestCase::new("Get Wallets", Builtin::GetWallets),
        TestCase::new("Generate AI Signal", Builtin::GenerateSignal),
        TestCase::new("Get Signals", Builtin::GetSignals),
        TestCase::new("Wallet Positions", Builtin::WalletPositions),
        TestCase::new("Wallet Activity", Builtin::WalletActivity),
        TestCase::new("Delete Wallet", Builtin::DeleteWallet),
    ]
}

pub async fn health_check(tester: &mut ApiTester) -> bool {
    tester.run_check(Check::get("Health Check", "")).await.success
}

pub async fn api_health(tester: &mut ApiTester) -> bool {
    let result = tester.run_check(Check::get("API Health Check", "health")).await;
    if result.success {
        let body = &result.payload;
        println!(
            "   Services initialized: {}",
            field(body, "services_initialized", "Unknown")
        );
        println!(
            "   Binance connected: {}",
            field(body, "binance_connected", "Unknown")
        );
    }
    result.success
}

pub async fn current_prices(tester: &mut ApiTester) -> bool {
    let result = tester
        .run_check(Check::get("Current Prices", "prices/current"))
        .await;
    if result.success {
        let body = &result.payload;
        println!("   Binance Price: ${}", field(body, "binance_price", "N/A"));
        println!("   Polymarket Price: {}", field(body, "polymarket_price", "N/A"));
        println!("   Price Delta: {}", field(body, "price_delta", "N/A"));
    }
    result.success
}

pub async fn add_wallet(tester: &mut ApiTester) -> bool {
    let wallet = &tester.config().wallet;
    let body = json!({
        "address": wallet.address,
        "label": wallet.label,
    });

    let result = tester
        .run_check(Check::post("Add Wallet", "wallets").json(body))
        .await;
    if result.success {
        if let Some(id) = wallet_id(&result.payload) {
            println!("   Created wallet ID: {}", id);
            tester.set_created_wallet_id(id);
        }
    }
    result.success
}

pub async fn get_wallets(tester: &mut ApiTester) -> bool {
    let result = tester.run_check(Check::get("Get Wallets", "wallets")).await;
    if result.success {
        println!("   Found {} wallets", json_len(&result.payload));
    }
    result.success
}

pub async fn generate_signal(tester: &mut ApiTester) -> bool {
    println!("🧠 Testing AI Signal Generation - This may take 10-15 seconds...");
    let result = tester
        .run_check(Check::post("Generate Signal", "signals/generate"))
        .await;
    if result.success {
        let body = &result.payload;
        println!("   Signal Type: {}", field(body, "signal_type", "N/A"));
        println!("   Confidence: {}", field(body, "confidence", "N/A"));
        println!(
            "   Reason: {}...",
            truncate_chars(&field(body, "reason", "N/A"), 100)
        );
    }
    result.success
}

pub async fn get_signals(tester: &mut ApiTester) -> bool {
    let result = tester.run_check(Check::get("Get Signals", "signals")).await;
    if result.success {
        println!("   Found {} signals", json_len(&result.payload));
    }
    result.success
}

pub async fn wallet_positions(tester: &mut ApiTester) -> bool {
    if tester.created_wallet_id().is_none() {
        return tester.skip(
            "Wallet Positions",
            "wallet positions test - no wallet created",
        );
    }

    let endpoint = format!("wallets/{}/positions", tester.config().wallet.address);
    let result = tester
        .run_check(Check::get("Wallet Positions", &endpoint))
        .await;
    if result.success {
        let body = &result.payload;
        println!("   Total Value: ${}", field(body, "total_value", "N/A"));
        println!("   Total PNL: {}", field(body, "total_pnl", "N/A"));
    }
    result.success
}

pub async fn wallet_activity(tester: &mut ApiTester) -> bool {
    if tester.created_wallet_id().is_none() {
        return tester.skip("Wallet Activity", "wallet activity test - no wallet created");
    }

    let endpoint = format!("wallets/{}/activity", tester.config().wallet.address);
    let result = tester
        .run_check(Check::get("Wallet Activity", &endpoint))
        .await;
    if result.success {
        println!("   Found {} activity records", json_len(&result.payload));
    }
    result.success
}

pub async fn delete_wallet(tester: &mut ApiTester) -> bool {
    let Some(id) = tester.created_wallet_id().map(str::to_string) else {
        return tester.skip("Delete Wallet", "wallet deletion test - no wallet to delete");
    };

    let endpoint = format!("wallets/{}", id);
    tester
        .run_check(Check::delete("Delete Wallet", &endpoint))
        .await
        .success
}

/// Render a response field for display, falling back to `default`
fn field(body: &Value, key: &str, default: &str) -> String {
    match body.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => default.to_string(),
    }
}

/// Number of records in a list response (or keys in an object response)
fn json_len(body: &Value) -> usize {
    match body {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::String(s) => s.chars().count(),
        _ => 0,
    }
}

/// Wallet identifier from an add-wallet response; null or empty ids are ignored
fn wallet_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
