//! Persistence of completed discovery sessions.
//!
//! A [`SessionStore`] keeps the most recently completed session and every
//! completed session by id, so a finished result can be shown again without
//! re-running the stream.
//!
//! # Example
//!
//! ```rust,ignore
//! use wayfarer_session::{FileStore, SessionStore};
//!
//! let store = FileStore::open("/tmp/wayfarer-sessions")?;
//! store.save_completed(&session)?;
//! let latest = store.latest()?;
//! ```

mod error;
mod file;
mod memory;
mod store;

pub use error::{Error, Result};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{
    COMPLETED_SESSION_KEY, SessionStore, StoredSession, restore_session, session_key,
};
