//! # digest-client
//!
//! Client-side note generation workflow for diff-digest.
//!
//! This crate provides:
//! - HTTP client for the digest server's diff and note endpoints
//! - Incremental reconstruction of streamed note JSON
//! - Keyed note state store with pure transitions and update broadcast
//! - Sequential batch processing with fixed pacing
//! - File-backed local cache with TTL expiry
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use digest_client::{ApiClient, NoteGenerator, NoteStore, NotesCache};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ApiClient::from_env().unwrap();
//!     let store = Arc::new(NoteStore::default());
//!     let generator = NoteGenerator::new(client.clone(), store.clone(), NotesCache::from_env());
//!
//!     let page = client.fetch_diffs(1, 10).await.unwrap();
//!     for item in &page.diffs {
//!         let entry = generator.generate_for(item).await;
//!         println!("{}: {:?}", item.id, entry.status);
//!     }
//! }
//! ```

pub mod api;
pub mod batch;
pub mod cache;
pub mod generator;
pub mod reconstruct;
pub mod store;

// Re-export core types
pub use digest_core::*;

pub use api::ApiClient;
pub use batch::{BatchOutcome, BatchProcessor};
pub use cache::NotesCache;
pub use generator::{GenerateNotes, NoteGenerator};
pub use reconstruct::{attempt_partial_parse, StreamAccumulator};
pub use store::{transition, NoteEvent, NoteStore, StoreUpdate};
