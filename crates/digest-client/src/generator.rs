//! Per-item note generation workflow.
//!
//! [`NoteGenerator`] runs one diff through its full lifecycle: guard
//! against duplicate work, open the server stream, feed chunks through
//! the frame decoder and the incremental reconstructor, record every
//! transition in the store, and persist the cache once the attempt
//! reaches a terminal state. The [`GenerateNotes`] trait is the seam the
//! batch processor drives, so tests can substitute scripted handlers.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{pin_mut, StreamExt};
use tracing::{debug, warn};

use digest_core::sse::FrameDecoder;
use digest_core::{DiffItem, GeneratedNotes, NoteEntry, NoteStatus, NotesRequest, StreamEvent};

use crate::api::ApiClient;
use crate::cache::NotesCache;
use crate::reconstruct::{attempt_partial_parse, StreamAccumulator};
use crate::store::{NoteEvent, NoteStore};

/// Handler seam for note generation.
#[async_trait]
pub trait GenerateNotes: Send + Sync {
    /// Generate notes for one diff, returning its terminal entry.
    async fn generate(&self, item: &DiffItem) -> NoteEntry;
}

/// The real generation workflow against a running digest server.
pub struct NoteGenerator {
    client: ApiClient,
    store: Arc<NoteStore>,
    cache: NotesCache,
    sync_mode: bool,
}

impl NoteGenerator {
    pub fn new(client: ApiClient, store: Arc<NoteStore>, cache: NotesCache) -> Self {
        Self {
            client,
            store,
            cache,
            sync_mode: false,
        }
    }

    /// Use the non-streaming endpoint instead of the SSE stream.
    pub fn with_sync_mode(mut self, sync_mode: bool) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    /// Seed the store from the local cache. Returns the number restored.
    pub async fn seed_from_cache(&self) -> usize {
        let cached = self.cache.load();
        let count = cached.len();
        for (diff_id, notes) in cached {
            self.store.apply(&diff_id, &NoteEvent::Seeded(notes)).await;
        }
        count
    }

    /// Run one generation attempt for a diff.
    ///
    /// Returns the existing entry untouched when the diff is already
    /// loading or complete. Otherwise applies Started, consumes the
    /// stream (or sync call) to a terminal event, applies it, persists
    /// the cache, and returns the terminal entry. Failures land in the
    /// returned entry rather than an error; one diff's outcome is its
    /// own business.
    pub async fn generate_for(&self, item: &DiffItem) -> NoteEntry {
        if let Some(entry) = self.store.entry(&item.id).await {
            if entry.status == NoteStatus::Loading || entry.is_complete() {
                debug!(diff_id = %item.id, status = ?entry.status, "Skipping generation");
                return entry;
            }
        }

        let request = NotesRequest {
            id: item.id.clone(),
            description: item.description.clone(),
            diff: item.diff.clone(),
        };

        self.store.apply(&item.id, &NoteEvent::Started).await;

        let terminal = if self.sync_mode {
            self.run_sync(&request).await
        } else {
            self.run_stream(&request).await
        };

        if let NoteEvent::Failed(message) = &terminal {
            warn!(diff_id = %item.id, error = %message, "Note generation failed");
        }

        let entry = self.store.apply(&item.id, &terminal).await;
        self.persist().await;
        entry
    }

    /// Consume the SSE stream for one request down to a terminal event.
    ///
    /// Deltas feed the accumulator and each successful speculative repair
    /// is applied as a Partial. The done event's text is authoritative:
    /// it either completes the attempt or fails it when unparsable. A
    /// stream that errors or closes before the done event is a failure;
    /// anything after the done event is irrelevant and unread.
    async fn run_stream(&self, request: &NotesRequest) -> NoteEvent {
        let stream = match self.client.stream_notes(request).await {
            Ok(stream) => stream,
            Err(e) => return NoteEvent::Failed(e.to_string()),
        };
        pin_mut!(stream);

        let mut decoder = FrameDecoder::new();
        let mut accumulator = StreamAccumulator::new();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return NoteEvent::Failed(format!("Stream aborted: {}", e)),
            };

            for frame in decoder.feed_bytes(&chunk) {
                let event: StreamEvent = match serde_json::from_str(&frame.data) {
                    Ok(event) => event,
                    Err(e) => {
                        debug!(error = %e, "Skipping unparsable stream frame");
                        continue;
                    }
                };

                if let Some(delta) = event.delta_text() {
                    accumulator.push(delta);
                    if let Some(partial) = attempt_partial_parse(accumulator.text()) {
                        self.store
                            .apply(&request.id, &NoteEvent::Partial(partial))
                            .await;
                    }
                } else if event.is_done() {
                    let text = event.done_text().unwrap_or_default();
                    return match GeneratedNotes::parse_final(text) {
                        Ok(notes) => NoteEvent::Completed(notes),
                        Err(e) => NoteEvent::Failed(format!("Unparsable final notes: {}", e)),
                    };
                }
                // Other event types relay through without local meaning.
            }
        }

        NoteEvent::Failed("Stream ended without a done event".to_string())
    }

    async fn run_sync(&self, request: &NotesRequest) -> NoteEvent {
        match self.client.generate_notes_sync(request).await {
            Ok(notes) => NoteEvent::Completed(notes),
            Err(e) => NoteEvent::Failed(e.to_string()),
        }
    }

    /// Write the done-with-no-error set through the cache.
    async fn persist(&self) {
        let completed = self.store.completed().await;
        self.cache.save(&completed);
    }
}

#[async_trait]
impl GenerateNotes for NoteGenerator {
    async fn generate(&self, item: &DiffItem) -> NoteEntry {
        self.generate_for(item).await
    }
}
