//! Error types for the API tester
//!
//! Every failure a check can hit is a variant here, so a run can be
//! reported both as console text and as a structured JSON document.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the API tester
#[derive(Error, Debug)]
pub enum Error {
    // === Check Failures ===
    #[error("Expected {expected}, got {actual}")]
    StatusMismatch {
        expected: u16,
        actual: u16,
        /// Error body as returned by the backend, if any
        detail: Option<String>,
    },

    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    #[error("Response body is not valid JSON: {0}")]
    BodyParse(String),

    #[error("Precondition not met: {0}")]
    PreconditionNotMet(String),

    #[error("Procedure panicked: {0}")]
    Panicked(String),

    // === Realtime Errors ===
    #[error("WebSocket handshake failed: {0}")]
    WebSocket(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    // === Setup Errors ===
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a status mismatch error
    pub fn status_mismatch(expected: u16, actual: u16, detail: Option<String>) -> Self {
        Self::StatusMismatch {
            expected,
            actual,
            detail,
        }
    }

    /// Create a precondition error for a skipped check
    pub fn precondition(reason: &str) -> Self {
        Self::PreconditionNotMet(reason.to_string())
    }

    /// Stable machine-readable code for reports
    pub fn code(&self) -> &'static str {
        match self {
            Error::StatusMismatch { .. } => "STATUS_MISMATCH",
            Error::Transport(e) if e.is_timeout() => "TIMEOUT",
            Error::Transport(_) => "TRANSPORT",
            Error::BodyParse(_) => "BODY_PARSE",
            Error::PreconditionNotMet(_) => "PRECONDITION_NOT_MET",
            Error::Panicked(_) => "PANICKED",
            Error::WebSocket(_) => "WEBSOCKET",
            Error::Timeout(_) => "TIMEOUT",
            Error::ClientBuild(_) | Error::ConfigParse(_) | Error::FileRead { .. } => "CONFIG",
            _ => "INTERNAL_ERROR",
        }
    }
}

/// Serializable error for the JSON run report
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
}

impl From<&Error> for ErrorReport {
    fn from(e: &Error) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}
