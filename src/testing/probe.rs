//! Realtime endpoint reachability
//!
//! Opens a WebSocket to the Socket.IO endpoint and closes it again as soon
//! as the handshake completes. The outcome is reported but never counted.

use std::time::Duration;

use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tracing::debug;

use crate::common::config::RealtimeConfig;
use crate::common::Error;

/// Result of the connectivity probe
#[derive(Debug)]
pub struct ProbeOutcome {
    pub url: String,
    pub connected: bool,
    pub error: Option<Error>,
}

/// Translate the base URL to its WebSocket scheme and append the realtime path
pub fn realtime_url(base_url: &str, realtime: &RealtimeConfig) -> String {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!(
        "{}{}?transport={}",
        ws_base, realtime.path, realtime.transport
    )
}

/// Attempt a WebSocket handshake within `limit`
pub async fn check_realtime(url: String, limit: Duration) -> ProbeOutcome {
    println!("\n🔌 Testing Socket.IO Connection...");
    debug!(url = %url, "Opening WebSocket");

    let result = match timeout(limit, connect_async(url.as_str())).await {
        Ok(Ok((mut stream, response))) => {
            debug!(status = %response.status(), "WebSocket handshake complete");
            if let Err(e) = stream.close(None).await {
                debug!(error = %e, "WebSocket close failed");
            }
            Ok(())
        }
        Ok(Err(e)) => Err(Error::WebSocket(e.to_string())),
        Err(_) => Err(Error::Timeout(limit.as_secs())),
    };

    match result {
        Ok(()) => {
            println!("✅ Socket.IO connection established");
            ProbeOutcome {
                url,
                connected: true,
                error: None,
            }
        }
        Err(e) => {
            println!("❌ Socket.IO connection failed: {}", e);
            ProbeOutcome {
                url,
                connected: false,
                error: Some(e),
            }
        }
    }
}

/// Run the probe as its own task and wait for it to finish
pub async fn spawn_probe(url: String, limit: Duration) -> ProbeOutcome {
    let handle = tokio::spawn(check_realtime(url.clone(), limit));
    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("❌ Socket.IO test error: {}", e);
            ProbeOutcome {
                url,
                connected: false,
                error: Some(Error::Internal(e.to_string())),
            }
        }
    }
}
