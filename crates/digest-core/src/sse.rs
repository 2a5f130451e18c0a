//! Incremental SSE frame decoding.
//!
//! Network reads deliver arbitrary byte windows, so a frame can arrive
//! split anywhere, including mid-line. [`FrameDecoder`] buffers raw text
//! across feeds, emits each frame once its blank-line terminator has
//! arrived, and holds the trailing partial frame for the next feed.
//!
//! Used on both sides of the relay: the inference crate decodes the
//! upstream model stream and the workflow client decodes the server's
//! re-emitted stream.

/// One decoded SSE frame.
///
/// `data` is the payload with multiple `data:` lines joined by newlines,
/// per the SSE processing model. `event` is the optional event name line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental SSE frame decoder with partial-frame holdover.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: String,
    /// Tail bytes of an incomplete UTF-8 sequence from [`feed_bytes`].
    pending: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw chunk; returns every frame completed by this chunk, in
    /// order. Incomplete trailing input stays buffered.
    pub fn feed(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buffer.push_str(chunk);

        // CRLF framing normalizes to bare newlines. Re-scanning the whole
        // buffer also repairs a \r\n pair that arrived split across feeds.
        if self.buffer.contains('\r') {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find("\n\n") {
            let raw: String = self.buffer.drain(..pos + 2).collect();
            if let Some(frame) = parse_frame(&raw[..pos]) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Byte-oriented variant of [`feed`] for network reads.
    ///
    /// A read can end mid-codepoint; the incomplete sequence is held back
    /// until its continuation bytes arrive instead of being mangled into
    /// replacement characters.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(chunk);

        let text = match std::str::from_utf8(&self.pending) {
            Ok(s) => {
                let t = s.to_string();
                self.pending.clear();
                t
            }
            Err(e) if e.error_len().is_none() => {
                // Truncated trailing scalar: decode the valid prefix only.
                let valid = e.valid_up_to();
                let t = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                t
            }
            Err(_) => {
                // Genuinely invalid bytes: substitute and keep the stream moving.
                let t = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                t
            }
        };

        self.feed(&text)
    }

    /// Whether any partial frame is still buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.pending.is_empty()
    }
}

/// Parse one complete frame body (terminator already stripped).
///
/// Returns `None` for frames with nothing to deliver (comment-only
/// keepalives, stray blank lines).
fn parse_frame(text: &str) -> Option<SseFrame> {
    let mut event = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("event:") {
            event = Some(strip_field_space(value).to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(strip_field_space(value));
        }
    }

    if event.is_none() && data_lines.is_empty() {
        return None;
    }

    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// A single space after the field colon is part of the delimiter.
fn strip_field_space(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}
