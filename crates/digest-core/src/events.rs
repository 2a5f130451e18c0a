//! Model stream event envelope and event-type constants.
//!
//! The server relays every upstream model event verbatim inside a
//! [`StreamEvent`] wrapper serialized as `{"event": "<type>", "data": {...}}`.
//! Consumers dispatch on the `event` field and ignore types they do not
//! understand, so new upstream event types flow through without code changes.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Result;

// ============================================================================
// Event type names (Responses API)
// ============================================================================

/// Incremental text fragment; payload carries the fragment in `delta`.
pub const OUTPUT_TEXT_DELTA: &str = "response.output_text.delta";

/// Terminal event; payload carries the complete generated text in `text`.
pub const OUTPUT_TEXT_DONE: &str = "response.output_text.done";

// ============================================================================
// Stream event envelope
// ============================================================================

/// One upstream model event, relayed verbatim.
///
/// `event` is the upstream type name and `data` the untouched upstream
/// payload. Only the delta and done types carry meaning here; everything
/// else passes through for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event: String,
    pub data: JsonValue,
}

impl StreamEvent {
    pub fn new(event: impl Into<String>, data: JsonValue) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn is_delta(&self) -> bool {
        self.event == OUTPUT_TEXT_DELTA
    }

    pub fn is_done(&self) -> bool {
        self.event == OUTPUT_TEXT_DONE
    }

    /// The text fragment of a delta event, when this is one.
    pub fn delta_text(&self) -> Option<&str> {
        if !self.is_delta() {
            return None;
        }
        self.data.get("delta").and_then(JsonValue::as_str)
    }

    /// The complete final text of a done event, when this is one.
    pub fn done_text(&self) -> Option<&str> {
        if !self.is_done() {
            return None;
        }
        self.data.get("text").and_then(JsonValue::as_str)
    }
}

/// Boxed stream of relay events produced by a model backend.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;
