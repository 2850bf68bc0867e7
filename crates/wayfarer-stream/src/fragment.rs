//! Per-channel reconstruction of JSON objects from text fragments.
//!
//! The generator streams each channel's JSON document in arbitrary slices.
//! [`ChunkBuffers`] accumulates those slices and hands back a parsed object
//! as soon as a balanced `{ ... }` closes and parses.
//!
//! Brace scanning is quote-aware: inside an object, braces that appear in
//! string literals (including after escaped quotes) do not move the depth
//! counter. Text before the first `{` is not scanned for strings.

use std::collections::HashMap;

use serde_json::Value;

use crate::types::Channel;

/// Markdown fence markers the generator sometimes wraps JSON in.
const FENCE_MARKERS: [&str; 2] = ["```json", "```"];

/// Accumulated, not-yet-consumed text for every channel.
#[derive(Debug, Clone, Default)]
pub struct ChunkBuffers {
    buffers: HashMap<Channel, String>,
    /// Channels ordered by their most recent fragment, oldest first.
    recency: Vec<Channel>,
}

impl ChunkBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all pending text.
    pub fn reset(&mut self) {
        self.buffers.clear();
        self.recency.clear();
    }

    /// Append a fragment and try to extract one complete object.
    ///
    /// At most one object is extracted per call; anything after it stays
    /// buffered for the next fragment (or for [`flush`](Self::flush)).
    pub fn push(&mut self, channel: Channel, fragment: &str) -> Option<Value> {
        self.recency.retain(|c| *c != channel);
        self.recency.push(channel);

        let buffer = self.buffers.entry(channel).or_default();
        buffer.push_str(fragment);
        strip_code_fences(buffer);
        extract_object(channel, buffer)
    }

    /// Extract every complete object still pending for `channel`.
    pub fn flush(&mut self, channel: Channel) -> Vec<Value> {
        let Some(buffer) = self.buffers.get_mut(&channel) else {
            return Vec::new();
        };

        let mut values = Vec::new();
        while let Some(value) = extract_object(channel, buffer) {
            values.push(value);
        }
        if !buffer.trim().is_empty() {
            tracing::debug!(
                channel = %channel,
                pending_bytes = buffer.len(),
                "Discarding unterminated channel text"
            );
        }
        values
    }

    /// Flush every channel, ordered by when each last received a fragment.
    pub fn flush_all(&mut self) -> Vec<(Channel, Value)> {
        let order = self.recency.clone();
        order
            .into_iter()
            .flat_map(|channel| {
                self.flush(channel)
                    .into_iter()
                    .map(move |value| (channel, value))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Text currently pending for `channel`.
    #[cfg(test)]
    pub(crate) fn pending(&self, channel: Channel) -> &str {
        self.buffers.get(&channel).map(String::as_str).unwrap_or("")
    }
}

fn strip_code_fences(buffer: &mut String) {
    if !buffer.contains("```") {
        return;
    }
    let mut stripped = buffer.clone();
    for marker in FENCE_MARKERS {
        stripped = stripped.replace(marker, "");
    }
    *buffer = stripped;
}

/// Parse the first balanced object in `buffer` and drop everything up to
/// and including it. Leaves the buffer untouched when the candidate does
/// not parse yet.
fn extract_object(channel: Channel, buffer: &mut String) -> Option<Value> {
    let (start, end) = find_balanced_object(buffer)?;
    match serde_json::from_str::<Value>(&buffer[start..=end]) {
        Ok(value) => {
            buffer.drain(..=end);
            tracing::trace!(channel = %channel, bytes = end + 1, "Reconstructed channel object");
            Some(value)
        }
        Err(e) => {
            tracing::trace!(channel = %channel, error = %e, "Candidate object not parseable yet");
            None
        }
    }
}

/// Byte range (inclusive) of the first brace-balanced object in `text`.
pub fn find_balanced_object(text: &str) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    // Every delimiter is ASCII, so byte offsets are valid char boundaries.
    for (i, byte) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| (s, i));
                }
            }
            _ => {}
        }
    }

    None
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// String values that deliberately contain braces, quotes and escapes.
    fn text_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z ]{0,12}".prop_map(|s| s),
            Just("{nested}".to_string()),
            Just("close } only".to_string()),
            Just("say \"hi {\"".to_string()),
            Just("back\\slash".to_string()),
            Just("Café ☕".to_string()),
        ]
    }

    fn payload_strategy() -> impl Strategy<Value = Value> {
        prop::collection::vec((text_strategy(), text_strategy()), 1..5).prop_map(|pairs| {
            let count = pairs.len();
            let pois: Vec<Value> = pairs
                .into_iter()
                .enumerate()
                .map(|(i, (name, description))| {
                    json!({"id": i.to_string(), "name": name, "description": description})
                })
                .collect();
            json!({"points_of_interest": pois, "meta": {"count": count}})
        })
    }

    proptest! {
        /// Property: any split of a serialized object reassembles to exactly that object.
        #[test]
        fn reassembly_is_fragmentation_invariant(
            value in payload_strategy(),
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
        ) {
            let text = serde_json::to_string(&value).unwrap();
            let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).skip(1).collect();
            let mut split_points: Vec<usize> = cuts
                .iter()
                .filter(|_| !boundaries.is_empty())
                .map(|idx| boundaries[idx.index(boundaries.len())])
                .collect();
            split_points.sort_unstable();
            split_points.dedup();

            let mut buffers = ChunkBuffers::new();
            let mut emitted = Vec::new();
            let mut last = 0;
            for point in split_points.into_iter().chain(std::iter::once(text.len())) {
                if let Some(v) = buffers.push(Channel::GeneralPois, &text[last..point]) {
                    emitted.push(v);
                }
                last = point;
            }
            emitted.extend(buffers.flush(Channel::GeneralPois));

            prop_assert_eq!(emitted, vec![value]);
        }
    }
}
