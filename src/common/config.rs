//! Configuration file handling

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Public preview deployment of the backend under test
pub const DEFAULT_BASE_URL: &str = "https://btc-signal-engine-1.preview.emergentagent.com";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the deployment, without the API prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix every REST endpoint lives under
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Wallet used by the wallet checks
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Realtime endpoint settings
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeouts: Timeouts::default(),
            wallet: WalletConfig::default(),
            realtime: RealtimeConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct Timeouts {
    /// Timeout for GET and DELETE requests
    #[serde(default = "default_request")]
    pub request_secs: u64,

    /// Timeout for POST requests (signal generation is slow)
    #[serde(default = "default_post")]
    pub post_secs: u64,

    /// Timeout for the WebSocket handshake
    #[serde(default = "default_probe")]
    pub probe_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: default_request(),
            post_secs: default_post(),
            probe_secs: default_probe(),
        }
    }
}

fn default_request() -> u64 {
    10
}
fn default_post() -> u64 {
    15
}
fn default_probe() -> u64 {
    10
}

impl Timeouts {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn post(&self) -> Duration {
        Duration::from_secs(self.post_secs)
    }

    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }
}

/// Wallet registered, inspected and deleted by the wallet checks
#[derive(Debug, Deserialize, Clone)]
pub struct WalletConfig {
    #[serde(default = "default_wallet_address")]
    pub address: String,

    #[serde(default = "default_wallet_label")]
    pub label: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            address: default_wallet_address(),
            label: default_wallet_label(),
        }
    }
}

fn default_wallet_address() -> String {
    "0x123456789abcdef0123456789abcdef012345678".to_string()
}

fn default_wallet_label() -> String {
    "Test Wallet #1".to_string()
}

/// Realtime (Socket.IO over WebSocket) endpoint settings
#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    /// Path of the Socket.IO endpoint, appended to the base URL
    #[serde(default = "default_realtime_path")]
    pub path: String,

    /// Value of the `transport` query parameter
    #[serde(default = "default_transport")]
    pub transport: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            path: default_realtime_path(),
            transport: default_transport(),
        }
    }
}

fn default_realtime_path() -> String {
    "/api/socket.io/".to_string()
}

fn default_transport() -> String {
    "websocket".to_string()
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Override the base URL, dropping any trailing slash
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Full URL of the REST API root, e.g. `https://host/api`
    pub fn api_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
    }
}
