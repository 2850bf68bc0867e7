//! The session store abstraction.
//!
//! Stores are synchronous and keyed by string. Completing a session writes
//! two records: a [`StoredSession`] wrapper (`{session_id, data, timestamp}`)
//! under [`COMPLETED_SESSION_KEY`], which [`SessionStore::latest`] reads back,
//! and the session's data alone under its [`session_key`] for
//! [`SessionStore::load`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wayfarer_stream::{Session, SessionData};

use crate::error::{Error, Result};

/// Key holding the most recently completed session.
pub const COMPLETED_SESSION_KEY: &str = "completed_session";

/// Key holding a specific session.
pub fn session_key(session_id: &str) -> String {
    format!("session_{session_id}")
}

/// A completed session rebuilt from its stored data.
///
/// Stored data only records the domain family, so an itinerary session comes
/// back as `general`.
pub fn restore_session(session_id: impl Into<String>, data: SessionData) -> Session {
    Session {
        session_id: session_id.into(),
        domain: data.domain(),
        city: None,
        data,
        is_complete: true,
        error: None,
    }
}

/// The record written under [`COMPLETED_SESSION_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub session_id: String,
    pub data: SessionData,
    /// When the session was saved.
    pub timestamp: DateTime<Utc>,
}

impl StoredSession {
    /// Wrap the data of `session`, stamping it with the current time.
    pub fn new(session: &Session) -> Self {
        Self {
            session_id: session.session_id.clone(),
            data: session.data.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Rebuild the completed session this record was saved from.
    pub fn into_session(self) -> Session {
        restore_session(self.session_id, self.data)
    }

    /// Override the save timestamp.
    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }
}

/// Trait for session storage backends.
///
/// Backends only move JSON documents; the provided methods decide what is
/// written where.
pub trait SessionStore: Send + Sync {
    /// Read the document under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write `value` under `key`, replacing what was there.
    fn put(&self, key: &str, value: &Value) -> Result<()>;

    /// Remove every stored document.
    fn clear(&self) -> Result<()>;

    /// Persist a completed session as both the latest and by id.
    fn save_completed(&self, session: &Session) -> Result<()> {
        if session.session_id.is_empty() {
            return Err(Error::Invalid("session has no id".to_string()));
        }
        let record = StoredSession::new(session);
        self.put(COMPLETED_SESSION_KEY, &serde_json::to_value(&record)?)?;
        self.put(
            &session_key(&session.session_id),
            &serde_json::to_value(&session.data)?,
        )?;
        tracing::debug!(session_id = %session.session_id, "Saved completed session");
        Ok(())
    }

    /// The most recently completed session, if any.
    fn latest(&self) -> Result<Option<StoredSession>> {
        self.get(COMPLETED_SESSION_KEY)?
            .map(|value| serde_json::from_value(value).map_err(Error::from))
            .transpose()
    }

    /// The data of a completed session by id.
    fn load(&self, session_id: &str) -> Result<SessionData> {
        let value = self
            .get(&session_key(session_id))?
            .ok_or_else(|| Error::NotFound(session_id.to_string()))?;
        Ok(serde_json::from_value(value)?)
    }
}
