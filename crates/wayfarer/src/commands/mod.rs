//! CLI command handlers.

pub mod config;
pub mod discover;
pub mod last;
pub mod output;
pub mod replay;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use wayfarer_client::{RateLimitConfig, WayfarerClient};
use wayfarer_config::LoadedConfig;
use wayfarer_session::FileStore;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Server URL to connect to.
    pub server_url: String,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Loaded configuration and where it came from.
    pub loaded: LoadedConfig,
}

impl Context {
    /// Build an API client from the effective configuration.
    pub fn client(&self) -> Result<WayfarerClient> {
        let config = &self.loaded.config;
        let server = config.server();
        let rate_limit = config.rate_limit();

        let rate_limit = if rate_limit.enabled {
            RateLimitConfig::new(rate_limit.max_requests, rate_limit.window())
        } else {
            RateLimitConfig::disabled()
        };

        let mut builder = WayfarerClient::builder()
            .base_url(&self.server_url)
            .connect_timeout(server.timeout())
            .stream_timeout(server.stream_timeout())
            .rate_limit(rate_limit)
            .redirect(config.stream().redirect)
            .session_store(Arc::new(self.store()?));
        if let Some(token) = server.auth_token {
            builder = builder.auth_token(token);
        }

        builder
            .build()
            .with_context(|| format!("Invalid server URL: {}", self.server_url))
    }

    /// Open the session store.
    pub fn store(&self) -> Result<FileStore> {
        let dir = wayfarer_config::storage_dir(&self.loaded.config)
            .context("No storage directory configured and no platform data directory")?;
        FileStore::open(&dir)
            .with_context(|| format!("Failed to open session store at {}", dir.display()))
    }
}
