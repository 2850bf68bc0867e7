//! Session state machine.
//!
//! [`SessionAssembler`] consumes decoded [`StreamEvent`]s for one stream and
//! produces [`AssemblyUpdate`]s. It moves `idle → streaming → completed` or
//! `streaming → errored`, and never leaves a terminal state.

use uuid::Uuid;

use crate::fragment::ChunkBuffers;
use crate::router;
use crate::types::{Domain, Session, SessionData, StartPayload, StreamEvent};

/// Lifecycle of one assembled stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    Idle,
    Streaming,
    Completed,
    Errored,
}

impl AssemblyState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssemblyState::Completed | AssemblyState::Errored)
    }
}

/// An update reported to the consumer of an assembled stream.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyUpdate {
    /// Snapshot after a handled event.
    Progress(Session),
    /// The stream finished; final session.
    Complete(Session),
    /// Where the finished result should be shown.
    Redirect { domain: Domain, data: SessionData },
    /// The stream failed; the session holds whatever arrived before.
    Error { message: String, session: Session },
}

impl AssemblyUpdate {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AssemblyUpdate::Progress(s) | AssemblyUpdate::Complete(s) => Some(s),
            AssemblyUpdate::Error { session, .. } => Some(session),
            AssemblyUpdate::Redirect { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssemblyUpdate::Complete(_) | AssemblyUpdate::Error { .. }
        )
    }
}

/// Assembler options.
#[derive(Debug, Clone, Default)]
pub struct AssemblerConfig {
    /// Emit a [`AssemblyUpdate::Redirect`] after completion.
    pub redirect: bool,
}

impl AssemblerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_redirect(mut self, redirect: bool) -> Self {
        self.redirect = redirect;
        self
    }
}

/// Builds one [`Session`] from one event stream.
#[derive(Debug)]
pub struct SessionAssembler {
    session: Session,
    buffers: ChunkBuffers,
    state: AssemblyState,
    live: bool,
    config: AssemblerConfig,
}

impl SessionAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            session: Session::default(),
            buffers: ChunkBuffers::new(),
            state: AssemblyState::Idle,
            live: true,
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    /// False once [`cleanup`](Self::cleanup) has run.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Whether no further events will be processed.
    pub fn is_finished(&self) -> bool {
        !self.live || self.state.is_terminal()
    }

    /// Stop producing updates; everything after this is a no-op.
    pub fn cleanup(&mut self) {
        if self.live {
            tracing::debug!(session_id = %self.session.session_id, "Assembler cleaned up");
        }
        self.live = false;
    }

    /// Handle one decoded event.
    pub fn handle(&mut self, event: StreamEvent) -> Vec<AssemblyUpdate> {
        if self.is_finished() {
            tracing::trace!(kind = event.kind(), "Ignoring event after stream finished");
            return Vec::new();
        }

        let event = match event {
            StreamEvent::Start { data } => {
                self.begin(data.unwrap_or_default());
                return self.progress();
            }
            other => other,
        };

        if self.state == AssemblyState::Idle {
            self.begin(StartPayload::default());
        }

        match event {
            StreamEvent::Chunk { data } => {
                if let Some(value) = self.buffers.push(data.part, &data.chunk) {
                    router::route(&mut self.session, data.part, value);
                }
                self.progress()
            }
            StreamEvent::Nearby { data } => {
                router::apply_nearby(&mut self.session, data);
                self.progress()
            }
            StreamEvent::Complete { .. } => self.finish(),
            event @ StreamEvent::Error { .. } => {
                let message = event
                    .error_message()
                    .unwrap_or_else(|| "Unknown stream error".to_string());
                self.fail(message)
            }
            StreamEvent::Unknown => {
                tracing::debug!("Ignoring unknown stream event");
                Vec::new()
            }
            direct => match direct.into_direct() {
                Ok((channel, value)) => {
                    router::route(&mut self.session, channel, value);
                    self.progress()
                }
                Err(other) => {
                    tracing::debug!(kind = other.kind(), "Unhandled stream event");
                    Vec::new()
                }
            },
        }
    }

    /// Complete the stream: explicit `complete` event or end of data.
    ///
    /// Idempotent; a second call produces nothing.
    pub fn finish(&mut self) -> Vec<AssemblyUpdate> {
        if self.is_finished() {
            return Vec::new();
        }
        if self.state == AssemblyState::Idle {
            self.begin(StartPayload::default());
        }

        for (channel, value) in self.buffers.flush_all() {
            router::route(&mut self.session, channel, value);
        }

        self.session.is_complete = true;
        self.state = AssemblyState::Completed;
        tracing::info!(
            session_id = %self.session.session_id,
            domain = %self.session.domain,
            items = self.session.data.item_count(),
            "Stream completed"
        );

        let mut updates = vec![AssemblyUpdate::Complete(self.session.clone())];
        if self.config.redirect {
            updates.push(AssemblyUpdate::Redirect {
                domain: self.session.domain,
                data: self.session.data.clone(),
            });
        }
        updates
    }

    /// Fail the stream with `message` (upstream error or transport failure).
    pub fn fail(&mut self, message: impl Into<String>) -> Vec<AssemblyUpdate> {
        if self.is_finished() {
            return Vec::new();
        }
        let message = message.into();
        self.session.error = Some(message.clone());
        self.state = AssemblyState::Errored;
        tracing::error!(
            session_id = %self.session.session_id,
            error = %message,
            "Stream failed"
        );
        vec![AssemblyUpdate::Error {
            message,
            session: self.session.clone(),
        }]
    }

    fn begin(&mut self, start: StartPayload) {
        let domain = start.domain();
        let session_id = start
            .session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        tracing::info!(session_id = %session_id, domain = %domain, "Stream started");

        let mut session = Session::new(session_id, domain);
        session.city = start.city;
        self.session = session;
        self.buffers.reset();
        self.state = AssemblyState::Streaming;
    }

    fn progress(&self) -> Vec<AssemblyUpdate> {
        vec![AssemblyUpdate::Progress(self.session.clone())]
    }
}

impl Default for SessionAssembler {
    fn default() -> Self {
        Self::new(AssemblerConfig::default())
    }
}
