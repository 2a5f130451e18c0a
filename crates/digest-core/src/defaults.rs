//! Centralized default constants for the diff-digest system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates should reference these constants instead of defining
//! their own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for the merged-PR listing.
pub const DIFFS_PER_PAGE: u32 = 10;

/// First page number (upstream listings are 1-based).
pub const FIRST_PAGE: u32 = 1;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// SSE keep-alive comment interval in seconds.
pub const SSE_KEEPALIVE_SECS: u64 = 15;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible API base URL.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default generation model for note writing.
pub const NOTES_MODEL: &str = "gpt-4o-mini";

/// Timeout for generation requests in seconds.
pub const NOTES_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// DIFF SOURCE
// =============================================================================

/// Default GitHub REST API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default repository owner for the diff listing.
pub const SOURCE_OWNER: &str = "rust-lang";

/// Default repository name for the diff listing.
pub const SOURCE_REPO: &str = "cargo";

/// User-Agent sent on every diff source request (GitHub rejects
/// anonymous clients without one).
pub const SOURCE_USER_AGENT: &str = "diff-digest";

/// Timeout for diff source requests in seconds.
pub const SOURCE_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// BATCH PROCESSING
// =============================================================================

/// Delay between consecutive batch items in milliseconds.
pub const BATCH_PACING_MS: u64 = 1000;

// =============================================================================
// LOCAL CACHE
// =============================================================================

/// Cache entry time-to-live in milliseconds (24 hours).
pub const NOTES_CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// File name of the persisted notes cache inside the data directory.
pub const CACHE_FILE_NAME: &str = "diff-digest-notes.json";

/// File name of the single-shot cache clear directive.
pub const CACHE_CLEAR_FILE_NAME: &str = "clear-notes-cache.json";

/// Action tag expected inside the clear directive.
pub const CACHE_CLEAR_ACTION: &str = "clear-notes-cache";

// =============================================================================
// EVENTS
// =============================================================================

/// Broadcast channel capacity for note store updates.
pub const STORE_EVENT_CAPACITY: usize = 256;
