//! SSE stream parsing for Responses API streaming output.
//!
//! Turns the raw byte stream of a streaming responses call into relay
//! events. Frames arrive split at arbitrary byte boundaries, so decoding
//! goes through [`FrameDecoder`] with its holdover buffer rather than
//! treating each read as a whole frame.

use futures::{stream, Stream, StreamExt};
use serde_json::Value as JsonValue;

use digest_core::sse::{FrameDecoder, SseFrame};
use digest_core::{Error, EventStream, Result, StreamEvent};

/// Parse the SSE byte stream of a streaming responses call.
///
/// Every upstream event is passed through verbatim; the `[DONE]` sentinel
/// ends quietly and unparsable frames surface as errors so the relay
/// terminates instead of silently dropping data.
pub fn parse_event_stream(
    stream: impl Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> EventStream {
    let events = stream
        .map(|chunk_result| {
            chunk_result.map_err(|e| Error::Transport(format!("Stream read failed: {}", e)))
        })
        .scan(FrameDecoder::new(), |decoder, result| {
            let batch: Vec<Result<StreamEvent>> = match result {
                Ok(bytes) => decoder
                    .feed_bytes(&bytes)
                    .into_iter()
                    .filter_map(event_from_frame)
                    .collect(),
                Err(e) => vec![Err(e)],
            };
            futures::future::ready(Some(batch))
        })
        .flat_map(stream::iter);

    Box::pin(events)
}

/// Convert one decoded frame into a relay event.
///
/// Returns `None` for the `[DONE]` sentinel and dataless frames. The event
/// name comes from the frame's `event:` line when present, else from the
/// payload's `type` field, else the SSE default name.
fn event_from_frame(frame: SseFrame) -> Option<Result<StreamEvent>> {
    if frame.data.is_empty() || frame.data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<JsonValue>(&frame.data) {
        Ok(data) => {
            let event = frame
                .event
                .or_else(|| {
                    data.get("type")
                        .and_then(JsonValue::as_str)
                        .map(String::from)
                })
                .unwrap_or_else(|| "message".to_string());
            Some(Ok(StreamEvent::new(event, data)))
        }
        Err(e) => Some(Err(Error::Serialization(format!(
            "Failed to parse stream frame: {}",
            e
        )))),
    }
}
