//! Streaming response assembly for Wayfarer discovery sessions.
//!
//! The discovery endpoint answers with a server-sent event stream whose
//! events carry either complete JSON documents or slices of JSON text for
//! one of several content channels. This crate turns that stream into a
//! single, incrementally updated [`Session`].
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use wayfarer_stream::{AssemblyUpdate, StreamDriver};
//!
//! # async fn example(body: impl futures::Stream<Item = Result<bytes::Bytes, std::io::Error>> + Send + 'static) {
//! let driver = StreamDriver::default();
//! let mut updates = driver.start(body);
//! while let Some(update) = updates.next().await {
//!     match update {
//!         AssemblyUpdate::Progress(session) => println!("{} items", session.data.item_count()),
//!         AssemblyUpdate::Complete(session) => println!("done: {}", session.session_id),
//!         AssemblyUpdate::Error { message, .. } => eprintln!("failed: {message}"),
//!         AssemblyUpdate::Redirect { domain, .. } => println!("show {domain}"),
//!     }
//! }
//! # }
//! ```
//!
//! # Layers
//!
//! - [`frame`]: SSE line framing into [`StreamEvent`]s
//! - [`fragment`]: per-channel reconstruction of JSON from text slices
//! - [`router`]: applying reconstructed objects to the session
//! - [`merge`]: identity-keyed deduplication of result collections
//! - [`assembler`]: the per-stream state machine
//! - [`driver`]: async driving, cancellation, and single-stream ownership

pub mod assembler;
pub mod driver;
pub mod error;
pub mod fragment;
pub mod frame;
pub mod merge;
pub mod router;
pub mod types;

pub use assembler::{AssemblerConfig, AssemblyState, AssemblyUpdate, SessionAssembler};
pub use driver::{StreamDriver, UpdateStream, assemble, collect_session};
pub use error::{Result, StreamError};
pub use fragment::ChunkBuffers;
pub use frame::{EventStream, decode_frames};
pub use merge::{Identifiable, merge};
pub use types::*;
