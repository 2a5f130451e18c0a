//! Core data models for diff-digest.
//!
//! These types are shared across all diff-digest crates and represent
//! the core domain entities. Web-facing types carry camelCase wire names
//! to match the HTTP and cache-file contracts.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// DIFF TYPES
// =============================================================================

/// A single merged pull-request diff fetched from the upstream source.
///
/// Immutable once fetched; pages of these accumulate as the caller
/// requests more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffItem {
    /// Stable identifier (the PR number rendered as a string).
    pub id: String,
    /// Human-readable summary (the PR title).
    pub description: String,
    /// Unified diff text for the full PR.
    pub diff: String,
    /// Link to the PR for reference.
    pub url: String,
}

/// One page of merged-PR diffs plus pagination cursors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffPage {
    pub diffs: Vec<DiffItem>,
    /// Next page number, or `None` when the listing is exhausted.
    pub next_page: Option<u32>,
    pub current_page: u32,
    pub per_page: u32,
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// AI-generated release notes for a single diff.
///
/// Either field may be an empty string when the model found nothing
/// meaningful to say for that audience.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedNotes {
    #[serde(default)]
    pub developer_note: String,
    #[serde(default)]
    pub marketing_note: String,
}

impl GeneratedNotes {
    /// Parse a model's complete output as the two-field notes object.
    ///
    /// Tolerates a fenced code block around the JSON, which some models
    /// emit despite instructions. Partial or malformed text is an error;
    /// speculative repair of in-flight text lives with the stream consumer.
    pub fn parse_final(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        Ok(serde_json::from_str(strip_code_fence(trimmed))?)
    }
}

/// Peel a ```json fence when the whole string is one fenced block.
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    match inner.strip_suffix("```") {
        Some(body) => body.trim(),
        None => text,
    }
}

/// Request body for note generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub diff: String,
}

impl NotesRequest {
    /// Reject requests with a missing or empty `id`, `description`, or `diff`.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() || self.description.is_empty() || self.diff.is_empty() {
            return Err(Error::InvalidInput(
                "Missing required fields: id, description, and diff are all required".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// NOTE STATE
// =============================================================================

/// Generation status for a single diff's notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    /// No generation attempted yet.
    Idle,
    /// A generation stream is in flight.
    Loading,
    /// The last attempt failed; `error_message` says why.
    Error,
    /// A done event delivered the final notes.
    Done,
}

/// Tracked generation state for one diff id.
///
/// Mutated only through the keyed store's transition function; `data`
/// holds speculative partials while `Loading` and the authoritative
/// value once `Done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub status: NoteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GeneratedNotes>,
}

impl NoteEntry {
    pub fn idle() -> Self {
        Self {
            status: NoteStatus::Idle,
            error_message: None,
            data: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            status: NoteStatus::Loading,
            error_message: None,
            data: None,
        }
    }

    pub fn done(data: GeneratedNotes) -> Self {
        Self {
            status: NoteStatus::Done,
            error_message: None,
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: NoteStatus::Error,
            error_message: Some(message.into()),
            data: None,
        }
    }

    /// Done with no recorded error. Complete entries are skipped by the
    /// batch processor and are the only ones persisted to the cache.
    pub fn is_complete(&self) -> bool {
        self.status == NoteStatus::Done && self.error_message.is_none()
    }
}

// =============================================================================
// CACHE TYPES
// =============================================================================

/// A persisted cache record for one diff id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Unix epoch milliseconds at first persistence.
    pub timestamp: i64,
    pub data: GeneratedNotes,
}

impl CacheEntry {
    /// Stamp `data` with the current wall clock.
    pub fn new(data: GeneratedNotes) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            data,
        }
    }

    /// Whether this entry has aged past `ttl_ms` as of `now_ms`.
    pub fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.timestamp >= ttl_ms
    }
}
