//! HTTP client for the diff-digest server.
//!
//! Thin reqwest wrapper over the three server endpoints. Non-success
//! responses are decoded into the server's `{error, details}` body and
//! surfaced as upstream errors carrying the HTTP status, so callers see
//! the same failure the server mirrored from its own upstream.

use std::time::Duration;

use futures::Stream;
use serde::Deserialize;
use tracing::debug;

use digest_core::{defaults, DiffPage, Error, GeneratedNotes, NotesRequest, Result};

/// Error body shape the server returns on failures.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// Client for the diff-digest HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(defaults::NOTES_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Create a client from environment configuration.
    ///
    /// Reads:
    /// - `DIGEST_SERVER_URL` (default: http://localhost:3000)
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("DIGEST_SERVER_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", defaults::SERVER_PORT));
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetch one page of merged-PR diffs.
    pub async fn fetch_diffs(&self, page: u32, per_page: u32) -> Result<DiffPage> {
        debug!(page, per_page, "Fetching diff page");
        let response = self
            .client
            .get(self.url("/diffs"))
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<DiffPage>()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Open the note generation stream for one diff.
    ///
    /// Returns the raw SSE byte stream once the server has committed to a
    /// success status; a failure before that point surfaces here with the
    /// server's error body and mirrored status. Failures after streaming
    /// begins surface as `Err` items while reading.
    pub async fn stream_notes(
        &self,
        request: &NotesRequest,
    ) -> Result<impl Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send> {
        debug!(diff_id = %request.id, "Opening note stream");
        let response = self
            .client
            .post(self.url("/generate-notes"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.bytes_stream())
    }

    /// One-shot note generation via the non-streaming endpoint.
    pub async fn generate_notes_sync(&self, request: &NotesRequest) -> Result<GeneratedNotes> {
        debug!(diff_id = %request.id, "Requesting notes without streaming");
        let response = self
            .client
            .post(self.url("/generate-notes/sync"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<GeneratedNotes>()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Map a non-success response to an upstream error carrying its status.
async fn error_from_response(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response
        .json::<ApiErrorBody>()
        .await
        .unwrap_or(ApiErrorBody {
            error: "Unknown error".to_string(),
            details: None,
        });
    let message = match body.details {
        Some(details) => format!("{}: {}", body.error, details),
        None => body.error,
    };
    Error::upstream(status, message)
}
