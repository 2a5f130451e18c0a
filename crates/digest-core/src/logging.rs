//! Structured logging schema and field name constants for diff-digest.
//!
//! All crates use these constants for consistent structured logging fields.
//! This ensures log aggregation tools can query by standardized field names
//! across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (stream events, frames) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → stream → sub-calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "inference", "source", "client"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "responses", "github", "batch", "cache", "store"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "stream_notes", "fetch_page", "process_all", "save"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Diff identifier (PR number) being operated on.
pub const DIFF_ID: &str = "diff_id";

/// Page number in a paginated listing.
pub const PAGE: &str = "page";

/// Upstream stream event type being handled.
pub const EVENT_TYPE: &str = "event_type";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of diffs in a page or batch.
pub const DIFF_COUNT: &str = "diff_count";

/// Number of stream events relayed or consumed.
pub const EVENT_COUNT: &str = "event_count";

/// Number of cache entries affected.
pub const ENTRY_COUNT: &str = "entry_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for generation.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
