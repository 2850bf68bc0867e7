//! SSE frame decoding.
//!
//! Turns a raw response body into decoded [`StreamEvent`]s. Malformed frames
//! and keep-alives are dropped here; only transport failures reach the
//! caller as errors.

use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::error::{Result, StreamError};
use crate::types::StreamEvent;

/// Boxed stream of decoded events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send + 'static>>;

/// Decode SSE frames from a byte stream.
///
/// The returned stream ends when the byte stream ends, after decoding any
/// final line that was not newline-terminated. A transport error is yielded
/// once and ends the stream.
pub fn decode_frames<S, E>(byte_stream: S) -> EventStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(futures::stream::unfold(
        FrameState {
            byte_stream: Box::pin(byte_stream),
            buffer: Vec::new(),
            done: false,
        },
        |mut state| async move {
            if state.done {
                return None;
            }

            loop {
                // Lines are split on raw bytes so a UTF-8 sequence cut by the
                // network is only decoded once it is whole.
                while let Some(line_end) = state.buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = state.buffer.drain(..=line_end).collect();
                    if let Some(event) = decode_line(&line) {
                        return Some((Ok(event), state));
                    }
                }

                match state.byte_stream.next().await {
                    Some(Ok(bytes)) => {
                        state.buffer.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        state.done = true;
                        return Some((Err(StreamError::Transport(e.to_string())), state));
                    }
                    None => {
                        state.done = true;
                        let rest = std::mem::take(&mut state.buffer);
                        return decode_line(&rest).map(|event| (Ok(event), state));
                    }
                }
            }
        },
    ))
}

struct FrameState<E> {
    byte_stream: Pin<Box<dyn Stream<Item = std::result::Result<Bytes, E>> + Send>>,
    buffer: Vec<u8>,
    done: bool,
}

fn decode_line(raw: &[u8]) -> Option<StreamEvent> {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return None;
    }

    match parse_sse_line(line)? {
        ("event", name) => {
            tracing::trace!(event = name, "SSE event line");
            None
        }
        ("data", payload) => parse_data(payload),
        _ => None,
    }
}

/// Split an SSE line into its field name and value.
///
/// Only `event` and `data` fields are recognised; comments and other fields
/// yield `None`.
pub fn parse_sse_line(line: &str) -> Option<(&str, &str)> {
    if let Some(value) = line.strip_prefix("event:") {
        Some(("event", value.strip_prefix(' ').unwrap_or(value)))
    } else if let Some(value) = line.strip_prefix("data:") {
        Some(("data", value.strip_prefix(' ').unwrap_or(value)))
    } else {
        None
    }
}

/// Decode a `data:` payload, dropping keep-alives and malformed JSON.
pub fn parse_data(payload: &str) -> Option<StreamEvent> {
    if payload.trim().is_empty() {
        return None;
    }

    match StreamEvent::from_json(payload) {
        Ok(event) => {
            tracing::trace!(kind = event.kind(), "Decoded stream event");
            Some(event)
        }
        Err(e) => {
            tracing::warn!(data = %payload, error = %e, "Failed to parse stream event");
            None
        }
    }
}
