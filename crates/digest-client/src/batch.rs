//! Sequential batch generation over a list of diffs.
//!
//! Items are processed strictly in order with a fixed pacing delay
//! between generations, keeping request rate against the model API
//! predictable. An atomic processing flag rejects overlapping batch
//! invocations; per-item triggers outside a batch are the generator's
//! concern.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use digest_core::{defaults, DiffItem, NoteStatus};

use crate::generator::GenerateNotes;
use crate::store::NoteStore;

/// Tally of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Strictly sequential batch driver with fixed pacing.
pub struct BatchProcessor {
    store: Arc<NoteStore>,
    running: AtomicBool,
    pacing_ms: u64,
}

impl BatchProcessor {
    pub fn new(store: Arc<NoteStore>) -> Self {
        Self {
            store,
            running: AtomicBool::new(false),
            pacing_ms: defaults::BATCH_PACING_MS,
        }
    }

    /// Override the inter-item pacing delay (tests use zero).
    pub fn with_pacing_ms(mut self, pacing_ms: u64) -> Self {
        self.pacing_ms = pacing_ms;
        self
    }

    /// Whether a batch run is currently in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Process every item in order, skipping complete and in-flight ones.
    ///
    /// Returns `None` when another run already holds the processing flag;
    /// overlapping invocations are rejected, not queued. One item's
    /// failure never aborts the rest.
    pub async fn run(
        &self,
        items: &[DiffItem],
        handler: &dyn GenerateNotes,
    ) -> Option<BatchOutcome> {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Batch already running, rejecting overlapping invocation");
            return None;
        }

        info!(item_count = items.len(), "Starting batch generation");
        let mut outcome = BatchOutcome::default();

        for (index, item) in items.iter().enumerate() {
            if let Some(entry) = self.store.entry(&item.id).await {
                if entry.is_complete() {
                    debug!(diff_id = %item.id, "Skipping item, notes already complete");
                    outcome.skipped += 1;
                    continue;
                }
                if entry.status == NoteStatus::Loading {
                    debug!(diff_id = %item.id, "Skipping item, generation in flight");
                    outcome.skipped += 1;
                    continue;
                }
            }

            let entry = handler.generate(item).await;
            if entry.is_complete() {
                outcome.completed += 1;
            } else {
                warn!(
                    diff_id = %item.id,
                    error = entry.error_message.as_deref().unwrap_or("unknown"),
                    "Batch item failed"
                );
                outcome.failed += 1;
            }

            if index + 1 < items.len() && self.pacing_ms > 0 {
                sleep(Duration::from_millis(self.pacing_ms)).await;
            }
        }

        info!(
            completed = outcome.completed,
            failed = outcome.failed,
            skipped = outcome.skipped,
            "Batch generation finished"
        );
        self.running.store(false, Ordering::SeqCst);
        Some(outcome)
    }
}
