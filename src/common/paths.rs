//! Configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/signal-api-tester/`
//! - macOS: `~/Library/Application Support/signal-api-tester/`
//! - Windows: `%APPDATA%\signal-api-tester\`

use std::path::PathBuf;

/// Name used for the configuration directory
const APP_NAME: &str = "signal-api-tester";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
