//! End-to-end tests for the API test runner
//!
//! A wiremock server stands in for the trading-signal backend, so the
//! request helper, the procedures and the final tally are exercised over
//! real HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use signal_api_tester::cli::{self, RunOptions};
use signal_api_tester::testing::{
    default_suite, run_suite, ApiTester, Builtin, Check, Procedure, TestCase,
};
use signal_api_tester::{Config, Error, Result};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WALLET: &str = "0x123456789abcdef0123456789abcdef012345678";

fn config_for(server: &MockServer) -> Config {
    Config::default().with_base_url(&server.uri())
}

fn tester_for(server: &MockServer) -> ApiTester {
    ApiTester::new(config_for(server)).expect("Failed to build tester")
}

fn ok_json(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

async fn mount(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Endpoints whose behaviour does not vary between scenarios
async fn mount_stable_endpoints(server: &MockServer) {
    mount(server, "GET", "/api/", ok_json(json!({"message": "Trading bot API"}))).await;
    mount(
        server,
        "GET",
        "/api/health",
        ok_json(json!({"services_initialized": true, "binance_connected": true})),
    )
    .await;
    mount(
        server,
        "GET",
        "/api/wallets",
        ok_json(json!([{"id": "w-42", "address": WALLET, "label": "Test Wallet #1"}])),
    )
    .await;
    mount(
        server,
        "POST",
        "/api/signals/generate",
        ok_json(json!({
            "signal_type": "BUY",
            "confidence": 0.74,
            "reason": "Binance leads Polymarket by 0.8% over the last five minutes",
        })),
    )
    .await;
    mount(server, "GET", "/api/signals", ok_json(json!([{"signal_type": "BUY"}]))).await;
}

async fn mount_prices(server: &MockServer) {
    mount(
        server,
        "GET",
        "/api/prices/current",
        ok_json(json!({"binance_price": 97250.5, "polymarket_price": 0.62, "price_delta": 0.8})),
    )
    .await;
}

async fn mount_wallet_details(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/wallets/{}/positions", WALLET)))
        .respond_with(ok_json(json!({"total_value": 1520.25, "total_pnl": 84.1, "positions": []})))
        .expect(expected_calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/wallets/{}/activity", WALLET)))
        .respond_with(ok_json(json!([{"type": "TRADE"}, {"type": "REDEEM"}])))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_add_wallet(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/wallets"))
        .and(body_json(json!({"address": WALLET, "label": "Test Wallet #1"})))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_passes_and_deletes_created_wallet() {
    let server = MockServer::start().await;
    mount_stable_endpoints(&server).await;
    mount_prices(&server).await;
    mount_wallet_details(&server, 1).await;
    mount_add_wallet(&server, ok_json(json!({"id": "w-42", "address": WALLET}))).await;
    Mock::given(method("DELETE"))
        .and(path("/api/wallets/w-42"))
        .respond_with(ok_json(json!({"message": "Wallet deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let report = run_suite(tester_for(&server), &default_suite()).await;

    assert_eq!(report.tests_run, 10);
    assert_eq!(report.tests_passed, 10);
    assert_eq!(report.success_rate, "100.0%");
    assert_eq!(report.exit_code, 0);
    assert_eq!(report.created_wallet_id.as_deref(), Some("w-42"));
    assert!(report.checks.iter().all(|c| c.counted && c.success));

    // The mock backend does not speak WebSocket; the probe fails but is not counted
    let realtime = report.realtime.as_ref().expect("probe should have run");
    assert!(!realtime.connected);
    assert!(realtime.url.starts_with("ws://"));
    assert!(realtime.url.ends_with("/api/socket.io/?transport=websocket"));
}

#[tokio::test]
async fn test_numeric_wallet_id_targets_delete_path() {
    let server = MockServer::start().await;
    mount_stable_endpoints(&server).await;
    mount_prices(&server).await;
    mount_wallet_details(&server, 1).await;
    mount_add_wallet(&server, ok_json(json!({"id": 7}))).await;
    Mock::given(method("DELETE"))
        .and(path("/api/wallets/7"))
        .respond_with(ok_json(json!({"message": "Wallet deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let report = run_suite(tester_for(&server), &default_suite()).await;

    assert_eq!(report.created_wallet_id.as_deref(), Some("7"));
    assert_eq!(report.exit_code, 0);
}

#[tokio::test]
async fn test_missing_prices_counts_as_failure_and_run_continues() {
    let server = MockServer::start().await;
    mount_stable_endpoints(&server).await;
    mount(
        &server,
        "GET",
        "/api/prices/current",
        ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})),
    )
    .await;
    mount_wallet_details(&server, 1).await;
    mount_add_wallet(&server, ok_json(json!({"id": "w-42"}))).await;
    mount(&server, "DELETE", "/api/wallets/w-42", ok_json(json!({}))).await;

    let report = run_suite(tester_for(&server), &default_suite()).await;

    assert_eq!(report.tests_run, 10);
    assert_eq!(report.tests_passed, 9);
    assert_eq!(report.success_rate, "90.0%");
    assert_eq!(report.exit_code, 1);

    let prices = report.check("Current Prices").unwrap();
    assert!(!prices.success);
    assert_eq!(prices.status, Some(404));
    let error = prices.error.as_ref().unwrap();
    assert_eq!(error.code, "STATUS_MISMATCH");
    assert_eq!(error.message, "Expected 200, got 404");

    // Later checks still ran
    assert!(report.check("Delete Wallet").unwrap().success);
}

#[tokio::test]
async fn test_failed_wallet_creation_skips_dependent_checks() {
    let server = MockServer::start().await;
    mount_stable_endpoints(&server).await;
    mount_prices(&server).await;
    // Dependent endpoints must never be called
    mount_wallet_details(&server, 0).await;
    Mock::given(method("DELETE"))
        .respond_with(ok_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    mount_add_wallet(
        &server,
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
    )
    .await;

    let report = run_suite(tester_for(&server), &default_suite()).await;

    assert_eq!(report.tests_run, 7);
    assert_eq!(report.tests_passed, 6);
    assert_eq!(report.exit_code, 1);
    assert!(report.created_wallet_id.is_none());

    for name in ["Wallet Positions", "Wallet Activity", "Delete Wallet"] {
        let skipped = report.check(name).unwrap();
        assert!(!skipped.counted, "{name} should not be counted");
        assert!(!skipped.success);
        assert_eq!(skipped.error.as_ref().unwrap().code, "PRECONDITION_NOT_MET");
    }
}

#[tokio::test]
async fn test_wallet_created_without_id_skips_without_failing_tally() {
    let server = MockServer::start().await;
    mount_stable_endpoints(&server).await;
    mount_prices(&server).await;
    mount_wallet_details(&server, 0).await;
    mount_add_wallet(&server, ok_json(json!({"address": WALLET}))).await;

    let report = run_suite(tester_for(&server), &default_suite()).await;

    // Skips return false but never enter the counters
    assert_eq!(report.tests_run, 7);
    assert_eq!(report.tests_passed, 7);
    assert_eq!(report.exit_code, 0);
    assert_eq!(report.checks.iter().filter(|c| !c.counted).count(), 3);
}

#[tokio::test]
async fn test_non_json_success_yields_empty_payload() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/api/",
        ResponseTemplate::new(200).set_body_string("OK"),
    )
    .await;

    let mut tester = tester_for(&server);
    let result = tester.run_check(Check::get("Health Check", "")).await;

    assert!(result.success);
    assert_eq!(result.payload, json!({}));
    let state = tester.state();
    assert_eq!(state.tests_run, 1);
    assert_eq!(state.tests_passed, 1);
    let error = state.records[0].error.as_ref().unwrap();
    assert!(matches!(error, Error::BodyParse(_)));
}

#[tokio::test]
async fn test_empty_success_body_yields_empty_payload() {
    let server = MockServer::start().await;
    mount(&server, "DELETE", "/api/wallets/w-1", ResponseTemplate::new(200)).await;

    let mut tester = tester_for(&server);
    let result = tester
        .run_check(Check::delete("Delete Wallet", "wallets/w-1"))
        .await;

    assert!(result.success);
    assert_eq!(result.payload, json!({}));
    assert!(tester.state().records[0].error.is_none());
}

#[tokio::test]
async fn test_status_mismatch_keeps_error_detail() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/api/signals",
        ResponseTemplate::new(503).set_body_json(json!({"detail": "LLM unavailable"})),
    )
    .await;

    let mut tester = tester_for(&server);
    let result = tester.run_check(Check::get("Get Signals", "signals")).await;

    assert!(!result.success);
    assert_eq!(result.payload, json!({}));
    let record = &tester.state().records[0];
    assert_eq!(record.status, Some(503));
    match record.error.as_ref().unwrap() {
        Error::StatusMismatch {
            expected,
            actual,
            detail,
        } => {
            assert_eq!(*expected, 200);
            assert_eq!(*actual, 503);
            assert!(detail.as_deref().unwrap().contains("LLM unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_custom_status_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wallets"))
        .and(header("content-type", "application/json"))
        .and(header("x-api-key", "secret"))
        .and(body_json(json!({"address": "0xabc", "label": "Other"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "w-9"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut tester = tester_for(&server);
    let check = Check::post("Create Wallet", "wallets")
        .json(json!({"address": "0xabc", "label": "Other"}))
        .header(
            reqwest::header::HeaderName::from_static("x-api-key"),
            reqwest::header::HeaderValue::from_static("secret"),
        )
        .expect_status(201);
    let result = tester.run_check(check).await;

    assert!(result.success);
    assert_eq!(result.payload["id"], "w-9");
}

#[tokio::test]
async fn test_connection_refused_is_a_counted_failure() {
    // Reserve a port and release it so nothing is listening there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = Config::default().with_base_url(&format!("http://127.0.0.1:{port}"));
    let mut tester = ApiTester::new(config).unwrap();

    let result = tester.run_check(Check::get("API Health Check", "health")).await;

    assert!(!result.success);
    let state = tester.state();
    assert_eq!(state.tests_run, 1);
    assert_eq!(state.tests_passed, 0);
    assert_eq!(state.records[0].status, None);
    assert_eq!(state.records[0].error.as_ref().unwrap().code(), "TRANSPORT");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/api/prices/current",
        ok_json(json!({})).set_delay(Duration::from_secs(3)),
    )
    .await;

    let mut config = config_for(&server);
    config.timeouts.request_secs = 1;
    let mut tester = ApiTester::new(config).unwrap();

    let result = tester
        .run_check(Check::get("Current Prices", "prices/current"))
        .await;

    assert!(!result.success);
    assert_eq!(tester.state().records[0].error.as_ref().unwrap().code(), "TIMEOUT");
}

struct Failing;

#[async_trait]
impl Procedure for Failing {
    async fn run(&self, _tester: &mut ApiTester) -> Result<bool> {
        Err(Error::Internal("backend returned unexpected shape".to_string()))
    }
}

struct Panicking;

#[async_trait]
impl Procedure for Panicking {
    async fn run(&self, _tester: &mut ApiTester) -> Result<bool> {
        panic!("procedure exploded")
    }
}

#[tokio::test]
async fn test_procedure_errors_do_not_abort_the_run() {
    let server = MockServer::start().await;
    mount_stable_endpoints(&server).await;

    let cases = vec![
        TestCase::new("Failing", Failing),
        TestCase::new("Panicking", Panicking),
        TestCase::new("Basic Health Check", Builtin::HealthCheck),
    ];
    let report = run_suite(tester_for(&server), &cases).await;

    assert_eq!(report.tests_run, 1);
    assert_eq!(report.tests_passed, 1);
    assert_eq!(report.exit_code, 0);

    let failing = report.check("Failing").unwrap();
    assert!(!failing.counted);
    assert_eq!(failing.error.as_ref().unwrap().code, "INTERNAL_ERROR");

    let panicking = report.check("Panicking").unwrap();
    let error = panicking.error.as_ref().unwrap();
    assert_eq!(error.code, "PANICKED");
    assert!(error.message.contains("procedure exploded"));

    assert!(report.check("Health Check").unwrap().success);
}

#[tokio::test]
async fn test_empty_suite_reports_zero_rate() {
    let server = MockServer::start().await;

    let report = run_suite(tester_for(&server), &[]).await;

    assert_eq!(report.tests_run, 0);
    assert_eq!(report.success_rate, "0%");
    assert_eq!(report.exit_code, 0);
}

#[tokio::test]
async fn test_cli_run_with_config_file_writes_report() {
    let server = MockServer::start().await;
    mount_stable_endpoints(&server).await;
    mount(
        &server,
        "GET",
        "/api/prices/current",
        ResponseTemplate::new(404),
    )
    .await;
    mount_wallet_details(&server, 1).await;
    mount_add_wallet(&server, ok_json(json!({"id": "w-42"}))).await;
    mount(&server, "DELETE", "/api/wallets/w-42", ok_json(json!({}))).await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "base_url = \"{}\"\n\n[timeouts]\nprobe_secs = 2\n",
            server.uri()
        ),
    )
    .unwrap();
    let report_path = dir.path().join("report.json");

    let code = cli::run(RunOptions {
        base_url: None,
        config: Some(config_path),
        report: Some(report_path.clone()),
    })
    .await
    .unwrap();

    assert_eq!(code, 1);

    let report: Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["tests_run"], 10);
    assert_eq!(report["tests_passed"], 9);
    assert_eq!(report["exit_code"], 1);
    assert_eq!(report["base_url"], server.uri());
    assert_eq!(report["checks"].as_array().unwrap().len(), 10);
    assert_eq!(report["realtime"]["connected"], false);
}

#[tokio::test]
async fn test_cli_run_with_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    let result = cli::run(RunOptions {
        config: Some(dir.path().join("missing.toml")),
        ..Default::default()
    })
    .await;

    assert!(matches!(result, Err(Error::FileRead { .. })));
}
