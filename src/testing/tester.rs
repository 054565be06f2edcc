//! Request helper and per-run state
//!
//! `ApiTester` owns the HTTP client and the counters for one run. Every
//! counted check goes through [`ApiTester::run_check`], which never fails:
//! transport errors and unexpected statuses become a failed [`TestResult`].

use std::time::{Duration, Instant};

use colored::Colorize;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

use crate::common::config::Config;
use crate::common::{truncate_chars, Error, Result};

/// Maximum characters of a response body echoed to the console
const PREVIEW_CHARS: usize = 200;

/// Outcome of a single check, handed back to the calling procedure
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub success: bool,
    /// Parsed JSON body, or an empty object
    pub payload: Value,
}

impl TestResult {
    fn failed() -> Self {
        Self {
            success: false,
            payload: empty_object(),
        }
    }
}

/// Ledger entry kept for the run report
#[derive(Debug)]
pub struct CheckRecord {
    pub name: String,
    /// Whether this entry contributed to `tests_run`
    pub counted: bool,
    pub success: bool,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    pub elapsed: Option<Duration>,
    /// Set on every failure, and on a success whose body could not be parsed
    pub error: Option<Error>,
}

/// Mutable state of one run
#[derive(Debug, Default)]
pub struct RunState {
    pub tests_run: usize,
    pub tests_passed: usize,
    /// Identifier returned by the add-wallet check
    pub created_wallet_id: Option<String>,
    pub records: Vec<CheckRecord>,
}

impl RunState {
    pub fn tests_failed(&self) -> usize {
        self.tests_run.saturating_sub(self.tests_passed)
    }

    pub fn all_passed(&self) -> bool {
        self.tests_passed == self.tests_run
    }
}

/// A single request to issue against the API
#[derive(Debug, Clone)]
pub struct Check {
    name: String,
    method: Method,
    endpoint: String,
    expected_status: u16,
    body: Option<Value>,
    headers: HeaderMap,
}

impl Check {
    fn new(name: &str, method: Method, endpoint: &str) -> Self {
        Self {
            name: name.to_string(),
            method,
            endpoint: endpoint.to_string(),
            expected_status: 200,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(name: &str, endpoint: &str) -> Self {
        Self::new(name, Method::GET, endpoint)
    }

    pub fn post(name: &str, endpoint: &str) -> Self {
        Self::new(name, Method::POST, endpoint)
    }

    pub fn delete(name: &str, endpoint: &str) -> Self {
        Self::new(name, Method::DELETE, endpoint)
    }

    /// Status the response must carry for the check to pass (default 200)
    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// JSON request body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Header sent in addition to, or instead of, the defaults
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Issues checks against one deployment and keeps the tally
pub struct ApiTester {
    client: Client,
    config: Config,
    api_url: String,
    state: RunState,
}

impl ApiTester {
    /// Create a tester for the deployment described by `config`
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("signal-api-tester/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))?;

        let api_url = config.api_url();
        debug!(api_url = %api_url, "API tester created");

        Ok(Self {
            client,
            config,
            api_url,
            state: RunState::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn into_state(self) -> RunState {
        self.state
    }

    pub fn created_wallet_id(&self) -> Option<&str> {
        self.state.created_wallet_id.as_deref()
    }

    pub fn set_created_wallet_id(&mut self, id: String) {
        self.state.created_wallet_id = Some(id);
    }

    /// Full URL for an endpoint relative to the API prefix
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_url, endpoint)
    }

    fn timeout_for(&self, method: &Method) -> Duration {
        if *method == Method::POST {
            self.config.timeouts.post()
        } else {
            self.config.timeouts.request()
        }
    }

    fn headers_for(&self, check: &Check) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &check.headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    /// Run one counted check and print its progress
    ///
    /// `tests_run` is incremented unconditionally, `tests_passed` only when
    /// the response status equals the expected one.
    pub async fn run_check(&mut self, check: Check) -> TestResult {
        self.state.tests_run += 1;
        println!("\n🔍 Testing {}...", check.name);

        let started = Instant::now();
        let (result, status, error) = self.execute(&check).await;

        if result.success {
            self.state.tests_passed += 1;
        }

        self.state.records.push(CheckRecord {
            name: check.name,
            counted: true,
            success: result.success,
            status,
            elapsed: Some(started.elapsed()),
            error,
        });

        result
    }

    async fn execute(&self, check: &Check) -> (TestResult, Option<u16>, Option<Error>) {
        let url = self.url_for(&check.endpoint);
        debug!(method = %check.method, url = %url, "Sending request");

        let mut request = self
            .client
            .request(check.method.clone(), &url)
            .headers(self.headers_for(check))
            .timeout(self.timeout_for(&check.method));
        if let Some(body) = &check.body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return transport_failure(e),
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return transport_failure(e),
        };

        if status == check.expected_status {
            println!("✅ {} - Status: {}", "PASSED".green(), status);
            if body.is_empty() {
                return (
                    TestResult {
                        success: true,
                        payload: empty_object(),
                    },
                    Some(status),
                    None,
                );
            }

            match serde_json::from_str::<Value>(&body) {
                Ok(payload) => {
                    println!(
                        "   Response preview: {}...",
                        truncate_chars(&payload.to_string(), PREVIEW_CHARS)
                    );
                    (
                        TestResult {
                            success: true,
                            payload,
                        },
                        Some(status),
                        None,
                    )
                }
                Err(e) => {
                    warn!(check = %check.name, error = %e, "Ignoring non-JSON response body");
                    (
                        TestResult {
                            success: true,
                            payload: empty_object(),
                        },
                        Some(status),
                        Some(Error::BodyParse(e.to_string())),
                    )
                }
            }
        } else {
            println!(
                "❌ {} - Expected {}, got {}",
                "FAILED".red(),
                check.expected_status,
                status
            );
            let detail = if body.is_empty() {
                None
            } else {
                match serde_json::from_str::<Value>(&body) {
                    Ok(error_detail) => {
                        println!("   Error: {}", error_detail);
                        Some(error_detail.to_string())
                    }
                    Err(_) => {
                        let raw = truncate_chars(&body, PREVIEW_CHARS);
                        println!("   Raw response: {}...", raw);
                        Some(raw.to_string())
                    }
                }
            };
            (
                TestResult::failed(),
                Some(status),
                Some(Error::status_mismatch(check.expected_status, status, detail)),
            )
        }
    }

    /// Record a check that did not run because an earlier one failed
    ///
    /// Skips are not counted in `tests_run`.
    pub fn skip(&mut self, name: &str, reason: &str) -> bool {
        println!("⚠️  {}", format!("Skipping {}", reason).yellow());
        self.record_uncounted(name, Error::precondition(reason));
        false
    }

    /// Record an error raised outside the request helper
    pub fn record_uncounted(&mut self, name: &str, error: Error) {
        self.state.records.push(CheckRecord {
            name: name.to_string(),
            counted: false,
            success: false,
            status: None,
            elapsed: None,
            error: Some(error),
        });
    }
}

fn transport_failure(e: reqwest::Error) -> (TestResult, Option<u16>, Option<Error>) {
    println!("❌ {} - Error: {}", "FAILED".red(), e);
    (TestResult::failed(), None, Some(Error::Transport(e)))
}

pub(crate) fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
