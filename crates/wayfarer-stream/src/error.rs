//! Stream assembly error types.

use thiserror::Error;

/// Errors surfaced while reading or assembling a discovery stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The underlying byte stream failed (network drop, reset, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream generator reported an error event.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A frame payload was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The stream was cancelled before it reached a terminal state.
    #[error("Stream cancelled")]
    Cancelled,
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;
