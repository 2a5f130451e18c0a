//! # digest-core
//!
//! Core types, traits, and abstractions for the diff-digest workspace.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other diff-digest crates depend on: the error taxonomy, the wire
//! models shared between server and client, the SSE frame decoder, and the
//! relay event envelope.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod sse;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventStream, StreamEvent, OUTPUT_TEXT_DELTA, OUTPUT_TEXT_DONE};
pub use models::{
    CacheEntry, DiffItem, DiffPage, GeneratedNotes, NoteEntry, NoteStatus, NotesRequest,
};
pub use sse::{FrameDecoder, SseFrame};
pub use traits::{DiffSource, NotesBackend};
