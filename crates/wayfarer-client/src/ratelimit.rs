//! Client-side rate limiting using governor.
//!
//! Requests are limited per endpoint, where the endpoint is the request
//! path with ids folded away, so `/sessions/123` and `/sessions/456` share
//! one budget.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Keyed limiter type alias (uses default clock).
type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Rate limit configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per window, per endpoint.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
    /// Enable rate limiting.
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
            enabled: true,
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Per-endpoint request limiter.
pub struct EndpointRateLimiter {
    limiter: KeyedLimiter,
}

impl std::fmt::Debug for EndpointRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointRateLimiter").finish_non_exhaustive()
    }
}

impl EndpointRateLimiter {
    /// Create a limiter, or `None` when the configuration disables limiting.
    pub fn new(config: &RateLimitConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }

        let max = NonZeroU32::new(config.max_requests)
            .ok_or_else(|| Error::Config("rate limit max_requests must be positive".to_string()))?;
        // Cells replenish evenly across the window; the burst lets the whole
        // window's budget be spent at once.
        let period = config.window / max.get();
        let quota = Quota::with_period(period)
            .ok_or_else(|| Error::Config("rate limit window must be positive".to_string()))?
            .allow_burst(max);

        Ok(Some(Self {
            limiter: RateLimiter::keyed(quota),
        }))
    }

    /// Admit one request to `path`, or report how long to wait.
    pub fn check(&self, path: &str) -> Result<()> {
        let endpoint = normalize_path(path);
        match self.limiter.check_key(&endpoint) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let retry_after = not_until.wait_time_from(self.limiter.clock().now());
                tracing::warn!(
                    endpoint = %endpoint,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Rate limit exceeded"
                );
                Err(Error::RateLimited {
                    endpoint,
                    retry_after,
                })
            }
        }
    }
}

/// Fold a request path into its endpoint key.
///
/// Drops the query string and trailing slash, and replaces path segments
/// that are UUIDs or all digits with `:id`.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');

    let normalized = path
        .split('/')
        .map(|segment| {
            let is_number = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
            if is_number || Uuid::try_parse(segment).is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        "/".to_string()
    } else {
        normalized
    }
}
