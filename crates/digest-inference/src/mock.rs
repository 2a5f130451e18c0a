//! Mock note generation backend for deterministic testing.
//!
//! Streams a scripted event sequence instead of calling a real model, so
//! consumers of [`NotesBackend`] can be tested without network access.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use digest_inference::mock::MockNotesBackend;
//!
//! #[tokio::test]
//! async fn test_with_mock_backend() {
//!     let backend = MockNotesBackend::new()
//!         .with_stream_failure_after(2, "connection reset");
//!
//!     let stream = backend.stream_notes(&request).await.unwrap();
//!     // third item is Err(Transport)
//! }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use serde_json::json;

use digest_core::{
    Error, EventStream, GeneratedNotes, NotesBackend, NotesRequest, Result, StreamEvent,
    OUTPUT_TEXT_DELTA, OUTPUT_TEXT_DONE,
};

/// Mock backend for testing note generation consumers.
#[derive(Clone)]
pub struct MockNotesBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model: String,
    notes: GeneratedNotes,
    script: Option<Vec<StreamEvent>>,
    fail_request: Option<(Option<u16>, String)>,
    fail_after: Option<(usize, String)>,
    latency_ms: u64,
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub diff_id: String,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model: "mock-notes".to_string(),
            notes: GeneratedNotes {
                developer_note: "Mock developer note.".to_string(),
                marketing_note: "Mock marketing note.".to_string(),
            },
            script: None,
            fail_request: None,
            fail_after: None,
            latency_ms: 0,
        }
    }
}

impl MockNotesBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the reported model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model = model.into();
        self
    }

    /// Set the notes returned (and scripted) for every request.
    pub fn with_notes(mut self, notes: GeneratedNotes) -> Self {
        Arc::make_mut(&mut self.config).notes = notes;
        self
    }

    /// Replace the default script with an explicit event sequence.
    pub fn with_script(mut self, events: Vec<StreamEvent>) -> Self {
        Arc::make_mut(&mut self.config).script = Some(events);
        self
    }

    /// Fail every request before any output, as an upstream error with the
    /// given status code.
    pub fn with_request_failure(mut self, status: Option<u16>, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).fail_request = Some((status, message.into()));
        self
    }

    /// Emit the first `after` scripted events, then a transport error.
    pub fn with_stream_failure_after(mut self, after: usize, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).fail_after = Some((after, message.into()));
        self
    }

    /// Set simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    /// Get number of streaming calls.
    pub fn stream_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == "stream")
            .count()
    }

    /// Get number of non-streaming calls.
    pub fn generate_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == "generate")
            .count()
    }

    fn log_call(&self, operation: &str, diff_id: &str) {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            diff_id: diff_id.to_string(),
            timestamp: std::time::Instant::now(),
        });
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    fn check_request_failure(&self) -> Result<()> {
        if let Some((status, message)) = &self.config.fail_request {
            return Err(Error::Upstream {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(())
    }
}

impl Default for MockNotesBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotesBackend for MockNotesBackend {
    async fn stream_notes(&self, request: &NotesRequest) -> Result<EventStream> {
        self.log_call("stream", &request.id);
        self.simulate_latency().await;
        self.check_request_failure()?;

        let script = match &self.config.script {
            Some(events) => events.clone(),
            None => script_for(&self.config.notes),
        };

        let mut items: Vec<Result<StreamEvent>> = script.into_iter().map(Ok).collect();
        if let Some((after, message)) = &self.config.fail_after {
            items.truncate(*after);
            items.push(Err(Error::Transport(message.clone())));
        }

        Ok(Box::pin(stream::iter(items)))
    }

    async fn generate_notes(&self, request: &NotesRequest) -> Result<GeneratedNotes> {
        self.log_call("generate", &request.id);
        self.simulate_latency().await;
        self.check_request_failure()?;

        Ok(self.config.notes.clone())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Build the default event script for a set of notes: the serialized JSON
/// split across three delta events, followed by a done event with the full
/// text.
pub fn script_for(notes: &GeneratedNotes) -> Vec<StreamEvent> {
    let text = serde_json::to_string(notes).unwrap_or_default();
    let mut events: Vec<StreamEvent> = split_chunks(&text, 3)
        .into_iter()
        .map(|chunk| {
            StreamEvent::new(
                OUTPUT_TEXT_DELTA,
                json!({"type": OUTPUT_TEXT_DELTA, "delta": chunk}),
            )
        })
        .collect();
    events.push(StreamEvent::new(
        OUTPUT_TEXT_DONE,
        json!({"type": OUTPUT_TEXT_DONE, "text": text}),
    ));
    events
}

fn split_chunks(text: &str, parts: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = text.chars().collect();
    let size = ((chars.len() + parts - 1) / parts).max(1);
    chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
