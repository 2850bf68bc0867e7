//! Configuration types.
//!
//! ```toml
//! [server]
//! url = "https://api.wayfarer.example"
//! auth_token = "..."
//! timeout_secs = 30
//! stream_timeout_secs = 300
//!
//! [rate_limit]
//! enabled = true
//! max_requests = 10
//! window_secs = 60
//!
//! [stream]
//! redirect = false
//!
//! [storage]
//! dir = "~/.local/share/wayfarer/sessions"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default server URL.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Root configuration. Absent sections fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WayfarerConfig {
    /// Server connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Client-side request limiting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitSection>,

    /// Stream assembly options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamSection>,

    /// Session persistence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSection>,
}

impl WayfarerConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: WayfarerConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.rate_limit.is_some() {
            self.rate_limit = other.rate_limit;
        }

        if other.stream.is_some() {
            self.stream = other.stream;
        }

        if other.storage.is_some() {
            self.storage = other.storage;
        }
    }

    /// Server section, or its defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Rate limit section, or its defaults.
    pub fn rate_limit(&self) -> RateLimitSection {
        self.rate_limit.clone().unwrap_or_default()
    }

    /// Stream section, or its defaults.
    pub fn stream(&self) -> StreamSection {
        self.stream.clone().unwrap_or_default()
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        let rate_limit = self.rate_limit();
        if rate_limit.enabled && rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.max_requests".to_string(),
                reason: "must be at least 1 when rate limiting is enabled".to_string(),
            });
        }
        if rate_limit.enabled && rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.window_secs".to_string(),
                reason: "must be at least 1 when rate limiting is enabled".to_string(),
            });
        }
        Ok(())
    }
}

/// Server connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the Wayfarer API.
    pub url: String,
    /// Bearer token sent with every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Connect timeout in seconds.
    pub timeout_secs: u64,
    /// Whole-stream timeout in seconds.
    pub stream_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            auth_token: None,
            timeout_secs: 30,
            stream_timeout_secs: 300,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }
}

/// Rate limit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    /// Enable rate limiting.
    pub enabled: bool,
    /// Requests allowed per window, per endpoint.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 10,
            window_secs: 60,
        }
    }
}

impl RateLimitSection {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Stream assembly configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSection {
    /// Report where a finished result should be shown.
    pub redirect: bool,
}

/// Session persistence configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory for saved sessions. Defaults to `sessions/` in the
    /// platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}
