//! Incremental reconstruction of the notes object from streamed deltas.
//!
//! The model emits the two-field notes JSON as arbitrary text fragments.
//! [`StreamAccumulator`] collects them per generation attempt and
//! [`attempt_partial_parse`] speculatively repairs the accumulated prefix
//! into a parseable object so the caller can surface fields as soon as
//! they are complete. A successful repair is never the terminal value;
//! the done event's text is the only authority for that.

use digest_core::GeneratedNotes;

/// Rolling text buffer for one generation attempt.
///
/// Owned by the task consuming the stream, so it needs no locking. Reset
/// before reuse; a retry must not see the previous attempt's text.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    buffer: String,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one delta fragment.
    pub fn push(&mut self, delta: &str) {
        self.buffer.push_str(delta);
    }

    /// The text accumulated so far.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard the buffer for a fresh attempt.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Best-effort parse of a partially accumulated notes object.
///
/// Pure function with no side effects. Returns `None` unless the buffer
/// contains a closing brace and both field-name markers; candidates are
/// repaired by prepending `{` or appending `}` when the trimmed text is
/// missing them, then parsed. Failure is the normal case mid-stream and
/// is silent. Fields absent from a successful parse default to empty
/// strings.
pub fn attempt_partial_parse(buffer: &str) -> Option<GeneratedNotes> {
    if !buffer.contains('}')
        || !buffer.contains("\"developerNote\"")
        || !buffer.contains("\"marketingNote\"")
    {
        return None;
    }

    let trimmed = buffer.trim();
    let mut candidate = String::with_capacity(trimmed.len() + 2);
    if !trimmed.starts_with('{') {
        candidate.push('{');
    }
    candidate.push_str(trimmed);
    if !trimmed.ends_with('}') {
        candidate.push('}');
    }

    serde_json::from_str(&candidate).ok()
}
