//! Error types for the remote transport.

use std::time::Duration;
use thiserror::Error;

/// Failures a transport call can report.
///
/// Every variant renders as a single human-readable message; that message is
/// what ends up on the collection state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::Decode(e.to_string())
    }
}
