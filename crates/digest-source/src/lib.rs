//! # digest-source
//!
//! Merged pull-request diff retrieval for diff-digest.
//!
//! This crate provides:
//! - GitHub REST API diff source (closed-PR listing + per-PR unified diffs)
//! - Pagination cursors for incremental fetching
//! - Config via environment variables with sensible defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use digest_source::GitHubDiffSource;
//! use digest_core::DiffSource;
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = GitHubDiffSource::from_env().unwrap();
//!     let page = source.fetch_page(1, 10).await.unwrap();
//!     println!("{} merged PRs", page.diffs.len());
//! }
//! ```

pub mod config;
pub mod github;

// Re-export core types
pub use digest_core::*;

pub use config::SourceConfig;
pub use github::GitHubDiffSource;
