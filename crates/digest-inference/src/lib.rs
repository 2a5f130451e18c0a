//! # digest-inference
//!
//! Note generation backend abstraction for diff-digest.
//!
//! This crate provides:
//! - OpenAI-compatible Responses API backend (streaming and non-streaming)
//! - SSE byte stream parsing into typed events
//! - Prompt construction for release note generation
//! - Mock backend for deterministic tests (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use digest_inference::ResponsesBackend;
//! use digest_core::{NotesBackend, NotesRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = ResponsesBackend::from_env().unwrap();
//!     let request = NotesRequest {
//!         id: "42".to_string(),
//!         description: "Fix parser panic on empty hunks".to_string(),
//!         diff: "--- a/parser.rs\n+++ b/parser.rs".to_string(),
//!     };
//!     let notes = backend.generate_notes(&request).await.unwrap();
//!     println!("{}", notes.developer_note);
//! }
//! ```

pub mod backend;
pub mod config;
pub mod prompt;
pub mod streaming;
pub mod types;

// Mock notes backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use digest_core::*;

pub use backend::ResponsesBackend;
pub use config::ResponsesConfig;
pub use streaming::parse_event_stream;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockNotesBackend;
