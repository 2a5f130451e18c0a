//! Responses API request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Request body for the responses endpoint.
#[derive(Debug, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub input: String,
    pub stream: bool,
}

// =============================================================================
// RESPONSE TYPES (non-streaming)
// =============================================================================

/// Response from the responses endpoint.
#[derive(Debug, Deserialize)]
pub struct ResponsesResponse {
    pub id: String,
    pub output: Vec<OutputItem>,
    pub usage: Option<ResponseUsage>,
}

/// One item of model output (message, tool call, ...).
#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

/// One content part inside an output message.
#[derive(Debug, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub part_type: String,
    #[serde(default)]
    pub text: String,
}

/// Token usage for a response.
#[derive(Debug, Deserialize)]
pub struct ResponseUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl ResponsesResponse {
    /// Concatenated text of every `output_text` content part, in order.
    pub fn output_text(&self) -> String {
        let mut text = String::new();
        for item in &self.output {
            for part in &item.content {
                if part.part_type == "output_text" {
                    text.push_str(&part.text);
                }
            }
        }
        text
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct UpstreamErrorResponse {
    pub error: UpstreamError,
}

/// Detailed error information.
#[derive(Debug, Deserialize)]
pub struct UpstreamError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responses_request_serialization() {
        let request = ResponsesRequest {
            model: "gpt-4o-mini".to_string(),
            instructions: Some("Respond with JSON.".to_string()),
            input: "PR #42: Fix cache".to_string(),
            stream: true,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("Respond with JSON."));
        assert!(json.contains("\"stream\":true"));
    }

    #[test]
    fn test_responses_request_without_instructions() {
        let request = ResponsesRequest {
            model: "test".to_string(),
            instructions: None,
            input: "test".to_string(),
            stream: false,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("instructions"));
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn test_responses_response_output_text() {
        let json = r#"{
            "id": "resp_123",
            "output": [{
                "type": "message",
                "content": [
                    {"type": "output_text", "text": "{\"developerNote\""},
                    {"type": "output_text", "text": ": \"x\"}"}
                ]
            }],
            "usage": {"input_tokens": 10, "output_tokens": 5, "total_tokens": 15}
        }"#;

        let response: ResponsesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.id, "resp_123");
        assert_eq!(response.output_text(), "{\"developerNote\": \"x\"}");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_responses_response_skips_non_text_parts() {
        let json = r#"{
            "id": "resp_456",
            "output": [
                {"type": "reasoning", "content": []},
                {"type": "message", "content": [
                    {"type": "refusal", "text": "nope"},
                    {"type": "output_text", "text": "kept"}
                ]}
            ],
            "usage": null
        }"#;

        let response: ResponsesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.output_text(), "kept");
    }

    #[test]
    fn test_responses_response_empty_output() {
        let json = r#"{"id": "resp_0", "output": [], "usage": null}"#;
        let response: ResponsesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.output_text(), "");
    }

    #[test]
    fn test_upstream_error_response_deserialization() {
        let json = r#"{
            "error": {
                "message": "Invalid API key",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        }"#;

        let response: UpstreamErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error.message, "Invalid API key");
        assert_eq!(response.error.error_type, "invalid_request_error");
        assert_eq!(response.error.code, Some("invalid_api_key".to_string()));
    }

    #[test]
    fn test_upstream_error_without_type_field() {
        let json = r#"{"error": {"message": "quota exceeded", "code": null}}"#;
        let response: UpstreamErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error.message, "quota exceeded");
        assert_eq!(response.error.error_type, "");
    }
}
