//! Keyed note state store with pure transitions and update broadcast.
//!
//! All per-diff generation state lives here. Mutations go through
//! [`NoteStore::apply`], which computes the next entry with the pure
//! [`transition`] function under a single write lock, so concurrent
//! callers can never interleave a stale read-modify-write. Every applied
//! transition is broadcast as a [`StoreUpdate`]; slow subscribers that
//! fall behind receive a `Lagged` error and miss updates, which is
//! acceptable for progress display where freshness beats completeness.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use digest_core::{defaults, GeneratedNotes, NoteEntry, NoteStatus};

/// A state-changing event for one diff's notes.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteEvent {
    /// A generation attempt began.
    Started,
    /// A speculative repair parsed; the attempt is still in flight.
    Partial(GeneratedNotes),
    /// The done event delivered the final notes.
    Completed(GeneratedNotes),
    /// The attempt failed; carries a descriptive message.
    Failed(String),
    /// Notes restored from the local cache at startup.
    Seeded(GeneratedNotes),
}

/// One applied transition, broadcast to subscribers.
#[derive(Debug, Clone)]
pub struct StoreUpdate {
    pub diff_id: String,
    pub entry: NoteEntry,
}

/// Compute the next entry for a diff given its previous entry and an event.
///
/// Pure function; the store applies it under lock. Rules:
/// - `Started` always resets to a fresh `Loading`, clearing any previous
///   error or data. Terminal states are per attempt; a re-trigger starts
///   a new attempt.
/// - `Partial` refines the data only while `Loading`. A partial arriving
///   in any other state carries no authority and leaves the entry as is.
/// - `Completed` and `Failed` are the attempt's terminal outcomes.
///   `Failed` clears data; a partial value must not outlive its attempt.
/// - `Seeded` fills only untouched entries. Cache restores never stomp
///   live or already-resolved state.
pub fn transition(prev: Option<&NoteEntry>, event: &NoteEvent) -> NoteEntry {
    match event {
        NoteEvent::Started => NoteEntry::loading(),
        NoteEvent::Partial(notes) => match prev {
            Some(entry) if entry.status == NoteStatus::Loading => NoteEntry {
                status: NoteStatus::Loading,
                error_message: None,
                data: Some(notes.clone()),
            },
            Some(entry) => entry.clone(),
            None => NoteEntry::idle(),
        },
        NoteEvent::Completed(notes) => NoteEntry::done(notes.clone()),
        NoteEvent::Failed(message) => NoteEntry::failed(message.clone()),
        NoteEvent::Seeded(notes) => match prev {
            None => NoteEntry::done(notes.clone()),
            Some(entry) if entry.status == NoteStatus::Idle => NoteEntry::done(notes.clone()),
            Some(entry) => entry.clone(),
        },
    }
}

/// Serialized keyed store of per-diff note entries.
pub struct NoteStore {
    entries: RwLock<HashMap<String, NoteEntry>>,
    tx: broadcast::Sender<StoreUpdate>,
}

impl NoteStore {
    /// Create a store with the given broadcast buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            entries: RwLock::new(HashMap::new()),
            tx,
        }
    }

    /// Apply an event to one diff's entry and broadcast the result.
    ///
    /// The write lock is held across the broadcast send so subscribers
    /// observe updates in the same order the map took them.
    pub async fn apply(&self, diff_id: &str, event: &NoteEvent) -> NoteEntry {
        let mut entries = self.entries.write().await;
        let next = transition(entries.get(diff_id), event);
        entries.insert(diff_id.to_string(), next.clone());

        debug!(diff_id, status = ?next.status, "Note store transition");
        let _ = self.tx.send(StoreUpdate {
            diff_id: diff_id.to_string(),
            entry: next.clone(),
        });
        next
    }

    /// The current entry for a diff, if any event has touched it.
    pub async fn entry(&self, diff_id: &str) -> Option<NoteEntry> {
        self.entries.read().await.get(diff_id).cloned()
    }

    /// Snapshot of every tracked entry.
    pub async fn entries(&self) -> HashMap<String, NoteEntry> {
        self.entries.read().await.clone()
    }

    /// The done-with-no-error subset, keyed by diff id.
    ///
    /// This is exactly the set the local cache persists.
    pub async fn completed(&self) -> HashMap<String, GeneratedNotes> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.is_complete())
            .filter_map(|(id, entry)| entry.data.clone().map(|data| (id.clone(), data)))
            .collect()
    }

    /// Whether a generation attempt is in flight for this diff.
    pub async fn is_loading(&self, diff_id: &str) -> bool {
        matches!(
            self.entries.read().await.get(diff_id),
            Some(entry) if entry.status == NoteStatus::Loading
        )
    }

    /// Whether this diff already has final notes with no error.
    pub async fn is_complete(&self, diff_id: &str) -> bool {
        matches!(
            self.entries.read().await.get(diff_id),
            Some(entry) if entry.is_complete()
        )
    }

    /// Subscribe to applied transitions. Each subscriber gets its own
    /// independent stream.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new(defaults::STORE_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_notes() -> GeneratedNotes {
        GeneratedNotes {
            developer_note: "Fixed caching bug".to_string(),
            marketing_note: "Faster pages".to_string(),
        }
    }

    fn partial_notes() -> GeneratedNotes {
        GeneratedNotes {
            developer_note: "Fixed cach".to_string(),
            marketing_note: String::new(),
        }
    }

    #[test]
    fn test_transition_started_resets_previous_state() {
        let failed = NoteEntry::failed("network down");
        let next = transition(Some(&failed), &NoteEvent::Started);
        assert_eq!(next.status, NoteStatus::Loading);
        assert!(next.error_message.is_none());
        assert!(next.data.is_none());

        let done = NoteEntry::done(sample_notes());
        let next = transition(Some(&done), &NoteEvent::Started);
        assert_eq!(next.status, NoteStatus::Loading);
        assert!(next.data.is_none());
    }

    #[test]
    fn test_transition_partial_refines_loading_entry() {
        let loading = NoteEntry::loading();
        let next = transition(Some(&loading), &NoteEvent::Partial(partial_notes()));
        assert_eq!(next.status, NoteStatus::Loading);
        assert_eq!(next.data, Some(partial_notes()));
    }

    #[test]
    fn test_transition_partial_never_clobbers_terminal_state() {
        let done = NoteEntry::done(sample_notes());
        let next = transition(Some(&done), &NoteEvent::Partial(partial_notes()));
        assert_eq!(next, done);

        let failed = NoteEntry::failed("aborted");
        let next = transition(Some(&failed), &NoteEvent::Partial(partial_notes()));
        assert_eq!(next, failed);
    }

    #[test]
    fn test_transition_partial_without_attempt_is_inert() {
        let next = transition(None, &NoteEvent::Partial(partial_notes()));
        assert_eq!(next.status, NoteStatus::Idle);
        assert!(next.data.is_none());
    }

    #[test]
    fn test_transition_completed_is_terminal_with_data() {
        let loading = NoteEntry::loading();
        let next = transition(Some(&loading), &NoteEvent::Completed(sample_notes()));
        assert!(next.is_complete());
        assert_eq!(next.data, Some(sample_notes()));
    }

    #[test]
    fn test_transition_failed_clears_partial_data() {
        let loading_with_data = NoteEntry {
            status: NoteStatus::Loading,
            error_message: None,
            data: Some(partial_notes()),
        };
        let next = transition(
            Some(&loading_with_data),
            &NoteEvent::Failed("stream aborted".to_string()),
        );
        assert_eq!(next.status, NoteStatus::Error);
        assert_eq!(next.error_message.as_deref(), Some("stream aborted"));
        assert!(next.data.is_none());
    }

    #[test]
    fn test_transition_seeded_fills_untouched_entries_only() {
        let next = transition(None, &NoteEvent::Seeded(sample_notes()));
        assert!(next.is_complete());

        let idle = NoteEntry::idle();
        let next = transition(Some(&idle), &NoteEvent::Seeded(sample_notes()));
        assert!(next.is_complete());

        let loading = NoteEntry::loading();
        let next = transition(Some(&loading), &NoteEvent::Seeded(sample_notes()));
        assert_eq!(next.status, NoteStatus::Loading);

        let failed = NoteEntry::failed("boom");
        let next = transition(Some(&failed), &NoteEvent::Seeded(sample_notes()));
        assert_eq!(next.status, NoteStatus::Error);
    }

    #[test]
    fn test_transition_is_pure() {
        let prev = NoteEntry::loading();
        let event = NoteEvent::Partial(partial_notes());
        let first = transition(Some(&prev), &event);
        let second = transition(Some(&prev), &event);
        assert_eq!(first, second);
        // Inputs are untouched.
        assert_eq!(prev, NoteEntry::loading());
    }

    #[tokio::test]
    async fn test_store_apply_and_read_back() {
        let store = NoteStore::new(32);
        assert!(store.entry("42").await.is_none());

        store.apply("42", &NoteEvent::Started).await;
        assert!(store.is_loading("42").await);
        assert!(!store.is_complete("42").await);

        store.apply("42", &NoteEvent::Completed(sample_notes())).await;
        assert!(store.is_complete("42").await);
        assert_eq!(
            store.entry("42").await.and_then(|e| e.data),
            Some(sample_notes())
        );
    }

    #[tokio::test]
    async fn test_store_broadcasts_each_transition_in_order() {
        let store = NoteStore::new(32);
        let mut rx = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);

        store.apply("7", &NoteEvent::Started).await;
        store.apply("7", &NoteEvent::Partial(partial_notes())).await;
        store.apply("7", &NoteEvent::Completed(sample_notes())).await;

        let first = rx.recv().await.unwrap();
        assert_eq!(first.diff_id, "7");
        assert_eq!(first.entry.status, NoteStatus::Loading);
        assert!(first.entry.data.is_none());

        let second = rx.recv().await.unwrap();
        assert_eq!(second.entry.status, NoteStatus::Loading);
        assert_eq!(second.entry.data, Some(partial_notes()));

        let third = rx.recv().await.unwrap();
        assert!(third.entry.is_complete());
    }

    #[tokio::test]
    async fn test_store_apply_without_subscribers_does_not_error() {
        let store = NoteStore::new(32);
        let entry = store.apply("9", &NoteEvent::Started).await;
        assert_eq!(entry.status, NoteStatus::Loading);
    }

    #[tokio::test]
    async fn test_store_completed_subset() {
        let store = NoteStore::new(32);
        store.apply("1", &NoteEvent::Seeded(sample_notes())).await;
        store.apply("2", &NoteEvent::Started).await;
        store
            .apply("3", &NoteEvent::Failed("quota exceeded".to_string()))
            .await;

        let completed = store.completed().await;
        assert_eq!(completed.len(), 1);
        assert_eq!(completed.get("1"), Some(&sample_notes()));
    }

    #[tokio::test]
    async fn test_store_retrigger_after_failure() {
        let store = NoteStore::new(32);
        store.apply("5", &NoteEvent::Started).await;
        store
            .apply("5", &NoteEvent::Failed("rate limited".to_string()))
            .await;

        let entry = store.apply("5", &NoteEvent::Started).await;
        assert_eq!(entry.status, NoteStatus::Loading);
        assert!(entry.error_message.is_none());
    }
}
