//! OpenAI-compatible Responses API backend for note generation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use digest_core::{Error, EventStream, GeneratedNotes, NotesBackend, NotesRequest, Result};

use crate::config::ResponsesConfig;
use crate::prompt;
use crate::streaming::parse_event_stream;
use crate::types::*;

/// Note generation backend speaking the Responses API.
pub struct ResponsesBackend {
    client: Client,
    config: ResponsesConfig,
}

impl ResponsesBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: ResponsesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "responses",
            base_url = %config.base_url,
            model = %config.model,
            "Initializing responses backend"
        );

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ResponsesConfig::default())
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ResponsesConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ResponsesConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    /// Send a responses call and surface non-success statuses as upstream
    /// errors carrying the original status code.
    async fn execute(&self, body: &ResponsesRequest) -> Result<reqwest::Response> {
        let response = self.build_request("/responses").json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body: UpstreamErrorResponse =
                response.json().await.unwrap_or(UpstreamErrorResponse {
                    error: UpstreamError {
                        message: "Unknown error".to_string(),
                        error_type: "unknown".to_string(),
                        code: None,
                    },
                });
            return Err(Error::Upstream {
                status: Some(status.as_u16()),
                message: body.error.message,
            });
        }

        Ok(response)
    }

    fn request_body(&self, request: &NotesRequest, stream: bool) -> ResponsesRequest {
        ResponsesRequest {
            model: self.config.model.clone(),
            instructions: Some(prompt::NOTES_INSTRUCTIONS.to_string()),
            input: prompt::notes_input(request),
            stream,
        }
    }
}

#[async_trait]
impl NotesBackend for ResponsesBackend {
    async fn stream_notes(&self, request: &NotesRequest) -> Result<EventStream> {
        debug!(
            diff_id = %request.id,
            model = %self.config.model,
            diff_len = request.diff.len(),
            "Starting streaming note generation"
        );

        let body = self.request_body(request, true);
        let response = self.execute(&body).await?;

        Ok(parse_event_stream(response.bytes_stream()))
    }

    async fn generate_notes(&self, request: &NotesRequest) -> Result<GeneratedNotes> {
        debug!(
            diff_id = %request.id,
            model = %self.config.model,
            "Generating notes (non-streaming)"
        );

        let body = self.request_body(request, false);
        let response = self.execute(&body).await?;

        let result: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse response: {}", e)))?;

        let text = result.output_text();
        debug!(
            diff_id = %request.id,
            response_len = text.len(),
            "Notes generated"
        );
        GeneratedNotes::parse_final(&text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
