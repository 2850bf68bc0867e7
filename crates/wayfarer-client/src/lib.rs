//! HTTP client for the Wayfarer travel discovery API.
//!
//! Discoveries are answered with a server-sent event stream. The client
//! opens that stream and hands it to [`wayfarer_stream`] for assembly, so
//! callers receive ready-to-render session snapshots rather than raw frames.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use wayfarer_client::{AssemblyUpdate, DiscoverRequest, Result, WayfarerClient};
//!
//! # async fn example() -> Result<()> {
//! let client = WayfarerClient::builder()
//!     .base_url("http://localhost:8000")
//!     .auth_token("secret")
//!     .build()?;
//!
//! let mut updates = client
//!     .discover(DiscoverRequest::new("Three days in Kyoto").with_profile("default"))
//!     .await?;
//! while let Some(update) = updates.next().await {
//!     match update {
//!         AssemblyUpdate::Progress(session) => {
//!             println!("{} items so far", session.data.item_count())
//!         }
//!         AssemblyUpdate::Complete(session) => println!("Done: {}", session.session_id),
//!         AssemblyUpdate::Error { message, .. } => eprintln!("Failed: {message}"),
//!         AssemblyUpdate::Redirect { .. } => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every request passes a per-endpoint rate limiter first (see
//! [`ratelimit`]); completed sessions are written to the configured
//! [`wayfarer_session::SessionStore`].

pub mod api;
pub mod client;
pub mod error;
pub mod ratelimit;
pub mod types;

pub use api::DiscoverApi;
pub use client::{ClientBuilder, WayfarerClient};
pub use error::{Error, Result};
pub use ratelimit::{EndpointRateLimiter, RateLimitConfig};
pub use types::{DiscoverRequest, UserLocation};

pub use wayfarer_stream::{AssemblyUpdate, Domain, Session, SessionData, StreamEvent};
