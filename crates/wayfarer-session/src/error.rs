//! Error types for session persistence.

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Session was not found in the store.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The session cannot be stored as given.
    #[error("Invalid session: {0}")]
    Invalid(String),

    /// Reading or writing the backing storage failed.
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
