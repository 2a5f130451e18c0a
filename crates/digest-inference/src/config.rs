//! Configuration for the Responses API backend.

use digest_core::defaults;

/// Configuration for an OpenAI-compatible Responses API backend.
#[derive(Debug, Clone)]
pub struct ResponsesConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model to use for note generation.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ResponsesConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_URL.to_string(),
            api_key: None,
            model: defaults::NOTES_MODEL.to_string(),
            timeout_seconds: defaults::NOTES_TIMEOUT_SECS,
        }
    }
}

impl ResponsesConfig {
    /// Load configuration from environment variables with fallback to defaults.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
    /// | `OPENAI_API_KEY` | unset |
    /// | `NOTES_MODEL` | `gpt-4o-mini` |
    /// | `NOTES_TIMEOUT_SECS` | `300` |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| defaults::OPENAI_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("NOTES_MODEL")
                .unwrap_or_else(|_| defaults::NOTES_MODEL.to_string()),
            timeout_seconds: std::env::var("NOTES_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::NOTES_TIMEOUT_SECS),
        }
    }
}
