//! Client error types.

use std::time::Duration;

use thiserror::Error;
use wayfarer_stream::StreamError;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code from server.
        code: String,
        /// Error message from server.
        message: String,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The local limiter refused the request before it was sent.
    #[error("Rate limit exceeded for {endpoint}, retry after {}ms", retry_after.as_millis())]
    RateLimited {
        /// Normalized endpoint path.
        endpoint: String,
        /// How long until the endpoint accepts another request.
        retry_after: Duration,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stream error.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_)) || matches!(self, Error::Api { status: 401, .. })
    }

    /// Check if this is a rate limit error, local or from the server.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. }) || matches!(self, Error::Api { status: 429, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body from the server.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default = "unknown_code")]
    code: String,
    #[serde(alias = "error")]
    message: String,
}

fn unknown_code() -> String {
    "unknown".to_string()
}

impl Error {
    /// Map a non-success response to an error, using its JSON body when it
    /// has one.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let Ok(body) = response.json::<ErrorBody>().await else {
            return Error::Api {
                status,
                code: unknown_code(),
                message: format!("HTTP {status}"),
            };
        };
        match status {
            401 => Error::Auth(body.message),
            404 => Error::NotFound(body.message),
            _ => Error::Api {
                status,
                code: body.code,
                message: body.message,
            },
        }
    }
}
