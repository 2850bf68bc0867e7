//! Discovery API.

use futures::StreamExt;
use wayfarer_stream::{
    AssemblyUpdate, EventStream, Session, UpdateStream, collect_session, decode_frames,
};

use crate::client::WayfarerClient;
use crate::error::Result;
use crate::types::DiscoverRequest;

/// Discovery API client.
pub struct DiscoverApi {
    client: WayfarerClient,
}

impl DiscoverApi {
    pub(crate) fn new(client: WayfarerClient) -> Self {
        Self { client }
    }

    /// Start a discovery and stream assembly updates.
    ///
    /// Starting a discovery cancels any discovery this client is still
    /// streaming. When a session store is configured, the completed session
    /// is saved as it is yielded; a failed save is logged and the update is
    /// delivered unchanged.
    pub async fn stream(&self, request: DiscoverRequest) -> Result<UpdateStream> {
        let response = self.client.open_stream(&request).await?;
        let shared = &self.client.shared;
        let updates = shared.driver.start(response.bytes_stream());

        let Some(store) = shared.store.clone() else {
            return Ok(updates);
        };

        Ok(Box::pin(updates.inspect(move |update| {
            if let AssemblyUpdate::Complete(session) = update
                && let Err(e) = store.save_completed(session)
            {
                tracing::warn!(
                    session_id = %session.session_id,
                    error = %e,
                    "Failed to persist completed session"
                );
            }
        })))
    }

    /// Run a discovery to completion and return the final session.
    pub async fn run(&self, request: DiscoverRequest) -> Result<Session> {
        let updates = self.stream(request).await?;
        Ok(collect_session(updates).await?)
    }

    /// Start a discovery and return the decoded events without assembly.
    pub async fn raw(&self, request: DiscoverRequest) -> Result<EventStream> {
        let response = self.client.open_stream(&request).await?;
        Ok(decode_frames(response.bytes_stream()))
    }
}

impl WayfarerClient {
    /// Start a discovery and stream assembly updates.
    ///
    /// Shorthand for `client.discovery().stream(request)`.
    pub async fn discover(&self, request: DiscoverRequest) -> Result<UpdateStream> {
        self.discovery().stream(request).await
    }

    /// Start a discovery and return the decoded events without assembly.
    pub async fn discover_raw(&self, request: DiscoverRequest) -> Result<EventStream> {
        self.discovery().raw(request).await
    }
}
