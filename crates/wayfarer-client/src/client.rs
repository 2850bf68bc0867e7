//! The discovery client and its builder.
//!
//! A client talks to exactly one endpoint: the discovery stream. The URL is
//! resolved once when the client is built, and every request passes the
//! rate limiter before it leaves the process.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use url::Url;
use wayfarer_session::SessionStore;
use wayfarer_stream::{AssemblerConfig, StreamDriver};

use crate::api::DiscoverApi;
use crate::error::{Error, Result};
use crate::ratelimit::{EndpointRateLimiter, RateLimitConfig};
use crate::types::DiscoverRequest;

/// Path of the discovery stream below the server's base URL.
const DISCOVER_PATH: &str = "api/v1/llm/chat/stream";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const STREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// Wayfarer API client.
///
/// Cheap to clone; clones share the rate limiter and the active stream, so
/// starting a discovery on one clone cancels a discovery running on another.
///
/// ```no_run
/// use wayfarer_client::{DiscoverRequest, WayfarerClient};
///
/// # async fn example() -> wayfarer_client::Result<()> {
/// let client = WayfarerClient::builder()
///     .base_url("http://localhost:8000")
///     .auth_token("secret")
///     .build()?;
///
/// let updates = client.discover(DiscoverRequest::new("museums in Vienna")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WayfarerClient {
    pub(crate) shared: Arc<Shared>,
}

pub(crate) struct Shared {
    pub(crate) http: reqwest::Client,
    pub(crate) discover_url: Url,
    pub(crate) stream_timeout: Duration,
    pub(crate) limiter: Option<EndpointRateLimiter>,
    pub(crate) store: Option<Arc<dyn SessionStore>>,
    pub(crate) driver: StreamDriver,
}

impl std::fmt::Debug for WayfarerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WayfarerClient")
            .field("discover_url", &self.shared.discover_url.as_str())
            .field("rate_limited", &self.shared.limiter.is_some())
            .field("persistent", &self.shared.store.is_some())
            .finish()
    }
}

impl WayfarerClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Full URL of the discovery stream.
    pub fn discover_url(&self) -> &Url {
        &self.shared.discover_url
    }

    /// Access the discovery API.
    pub fn discovery(&self) -> DiscoverApi {
        DiscoverApi::new(self.clone())
    }

    /// Cancel the active discovery stream, if any.
    pub fn cancel(&self) {
        self.shared.driver.cleanup();
    }

    /// Send a discovery request and return the response once its status is
    /// known to be a success.
    pub(crate) async fn open_stream(&self, request: &DiscoverRequest) -> Result<reqwest::Response> {
        let url = &self.shared.discover_url;
        if let Some(limiter) = &self.shared.limiter {
            limiter.check(url.path())?;
        }

        tracing::debug!(url = %url, "Opening discovery stream");
        let response = self
            .shared
            .http
            .post(url.clone())
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .timeout(self.shared.stream_timeout)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Error::from_response(response).await)
        }
    }
}

/// Builder for [`WayfarerClient`].
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_token: Option<String>,
    connect_timeout: Duration,
    stream_timeout: Duration,
    rate_limit: RateLimitConfig,
    store: Option<Arc<dyn SessionStore>>,
    redirect: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            connect_timeout: CONNECT_TIMEOUT,
            stream_timeout: STREAM_TIMEOUT,
            rate_limit: RateLimitConfig::default(),
            store: None,
            redirect: false,
        }
    }
}

impl ClientBuilder {
    /// Server root. A path prefix such as `/wayfarer` is kept.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Bearer token sent with every request.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Upper bound on one whole discovery stream.
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Persist completed sessions to `store`.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Emit a redirect update after each completed discovery.
    pub fn redirect(mut self, redirect: bool) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn build(self) -> Result<WayfarerClient> {
        let base = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;
        let discover_url = discover_url(&base)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::Config("auth token is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("wayfarer-client/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(self.connect_timeout)
            .build()?;

        Ok(WayfarerClient {
            shared: Arc::new(Shared {
                http,
                discover_url,
                stream_timeout: self.stream_timeout,
                limiter: EndpointRateLimiter::new(&self.rate_limit)?,
                store: self.store,
                driver: StreamDriver::new(AssemblerConfig::new().with_redirect(self.redirect)),
            }),
        })
    }
}

/// Resolve the discovery endpoint below `base`, treating `base` as a
/// directory even without a trailing slash.
fn discover_url(base: &str) -> Result<Url> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    Ok(base.join(DISCOVER_PATH)?)
}
