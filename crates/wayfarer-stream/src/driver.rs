//! Async driving of the assembler over a response body.
//!
//! [`assemble`] is the streaming entry point: it decodes frames, feeds them
//! to a [`SessionAssembler`] and yields the resulting updates until the
//! stream completes, fails, or is cancelled. [`StreamDriver`] keeps at most
//! one such stream alive at a time and owns its reader, so releasing a stream
//! closes the underlying body even if nobody polls the old updates again.

use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::assembler::{AssemblerConfig, AssemblyUpdate, SessionAssembler};
use crate::error::{Result, StreamError};
use crate::frame::decode_frames;
use crate::types::Session;

/// Boxed stream of assembly updates.
pub type UpdateStream = Pin<Box<dyn Stream<Item = AssemblyUpdate> + Send + 'static>>;

/// Assemble a session from a raw SSE byte stream.
///
/// After `cancellation` fires the returned stream ends without yielding
/// anything further.
pub fn assemble<S, E>(
    byte_stream: S,
    assembler: SessionAssembler,
    cancellation: CancellationToken,
) -> UpdateStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let mut events = decode_frames(byte_stream);

    Box::pin(async_stream::stream! {
        let mut assembler = assembler;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    assembler.cleanup();
                    return;
                }
                next = events.next() => next,
            };

            let updates = match next {
                Some(Ok(event)) => assembler.handle(event),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Discovery stream transport failed");
                    assembler.fail(e.to_string())
                }
                None => assembler.finish(),
            };

            for update in updates {
                if cancellation.is_cancelled() {
                    assembler.cleanup();
                    return;
                }
                yield update;
            }

            if assembler.is_finished() {
                return;
            }
        }
    })
}

/// Wait for an update stream to finish and return the final session.
///
/// Errors with [`StreamError::Upstream`] carrying the failure message when
/// the stream failed, and [`StreamError::Cancelled`] when it ended without
/// a terminal update.
pub async fn collect_session(mut updates: UpdateStream) -> Result<Session> {
    while let Some(update) = updates.next().await {
        match update {
            AssemblyUpdate::Complete(session) => return Ok(session),
            AssemblyUpdate::Error { message, .. } => return Err(StreamError::Upstream(message)),
            AssemblyUpdate::Progress(_) | AssemblyUpdate::Redirect { .. } => {}
        }
    }
    Err(StreamError::Cancelled)
}

type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, String>> + Send>>;

/// Reader of an active stream, shared between the driver and the stream.
type ReaderSlot = Arc<Mutex<Option<ByteStream>>>;

/// Body that reads through `slot`; ends once the reader is taken out.
fn read_through(
    slot: ReaderSlot,
) -> impl Stream<Item = std::result::Result<Bytes, String>> + Send + 'static {
    futures::stream::poll_fn(move |cx| match slot.lock().as_mut() {
        Some(reader) => reader.as_mut().poll_next(cx),
        None => Poll::Ready(None),
    })
}

struct ActiveStream {
    token: CancellationToken,
    reader: ReaderSlot,
}

impl std::fmt::Debug for ActiveStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveStream")
            .field("cancelled", &self.token.is_cancelled())
            .field("reading", &self.reader.lock().is_some())
            .finish()
    }
}

impl ActiveStream {
    /// Stop the update stream and drop its reader.
    fn release(self) {
        self.token.cancel();
        let reader = self.reader.lock().take();
        drop(reader);
    }
}

/// Owns the single active stream of one consumer.
///
/// Starting a new stream releases the previous one first, so two streams
/// never feed the same consumer.
#[derive(Debug, Default)]
pub struct StreamDriver {
    active: Mutex<Option<ActiveStream>>,
    config: AssemblerConfig,
}

impl StreamDriver {
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            active: Mutex::new(None),
            config,
        }
    }

    /// Start assembling `byte_stream`, releasing any previous stream.
    pub fn start<S, E>(&self, byte_stream: S) -> UpdateStream
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let reader: ByteStream =
            Box::pin(byte_stream.map(|item| item.map_err(|e| e.to_string())));
        let active = ActiveStream {
            token: CancellationToken::new(),
            reader: Arc::new(Mutex::new(Some(reader))),
        };
        let token = active.token.clone();
        let slot = active.reader.clone();

        let previous = self.active.lock().replace(active);
        if let Some(previous) = previous {
            tracing::debug!("Releasing previous discovery stream");
            previous.release();
        }

        assemble(
            read_through(slot),
            SessionAssembler::new(self.config.clone()),
            token,
        )
    }

    /// Release the active stream, if any.
    pub fn cleanup(&self) {
        let active = self.active.lock().take();
        if let Some(active) = active {
            active.release();
        }
    }

    /// Whether a started stream has not been released.
    pub fn is_active(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|active| !active.token.is_cancelled())
    }
}
