//! Core traits for diff-digest abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::events::EventStream;
use crate::models::{DiffPage, GeneratedNotes, NotesRequest};

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend that turns a diff into release notes via an AI model.
#[async_trait]
pub trait NotesBackend: Send + Sync {
    /// Start a streaming generation for the given diff.
    ///
    /// Events arrive incrementally as the model produces them; the stream
    /// ends after the done event or yields an error on transport failure.
    async fn stream_notes(&self, request: &NotesRequest) -> Result<EventStream>;

    /// One-shot generation returning the final parsed notes.
    async fn generate_notes(&self, request: &NotesRequest) -> Result<GeneratedNotes>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// DIFF SOURCE TRAITS
// =============================================================================

/// Source of merged pull-request diffs.
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Fetch one page of merged-PR diffs.
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<DiffPage>;
}
