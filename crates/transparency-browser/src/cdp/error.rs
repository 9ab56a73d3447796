//! Failures talking to Chrome over the DevTools protocol.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpError {
    /// The debugging endpoint did not answer `/json/version`.
    #[error("No DevTools endpoint at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    /// WebSocket or HTTP failure on an established connection.
    #[error("DevTools transport failed: {0}")]
    Transport(String),

    /// Chrome answered a command with an error object.
    #[error("Chrome rejected command ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("Malformed DevTools message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("DevTools reply has no {0}")]
    MissingField(&'static str),

    #[error("Could not load {0}")]
    NavigationFailed(String),

    /// Exception thrown by evaluated page script.
    #[error("Page script threw: {0}")]
    JavaScript(String),

    #[error("{0} timed out")]
    Timeout(String),

    /// The socket closed while a command was pending.
    #[error("DevTools connection closed")]
    SessionClosed,
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::Transport(format!("websocket: {}", e))
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Transport(format!("http: {}", e))
    }
}
