//! Prompt construction for release-note generation.
//!
//! The model must answer with nothing but the two-field JSON object; the
//! streaming reconstructor on the client side depends on that shape.

use digest_core::NotesRequest;

/// Fixed instruction block constraining output to the notes contract.
pub const NOTES_INSTRUCTIONS: &str = r#"You are a release notes assistant. Given a merged pull request's description and diff, write two short notes about the change.

Respond with a single JSON object with exactly these two string fields:
- "developerNote": a technical summary of what changed, for engineers reading release notes
- "marketingNote": the user-facing benefit in plain language, free of jargon

Rules:
- Each note is at most two sentences.
- Use only information present in the description and diff. Never invent features, fixes, or numbers.
- If there is nothing meaningful to say for a field, use an empty string for that field.
- Output the JSON object only. No surrounding text, no code fences, no commentary."#;

/// Generates the model input for one diff.
pub fn notes_input(request: &NotesRequest) -> String {
    format!(
        "Pull request #{}: {}\n\nDiff:\n{}",
        request.id, request.description, request.diff
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> NotesRequest {
        NotesRequest {
            id: "42".to_string(),
            description: "Fix stale cache reads".to_string(),
            diff: "--- a/cache.rs\n+++ b/cache.rs\n-  old\n+  new".to_string(),
        }
    }

    #[test]
    fn test_instructions_name_both_fields() {
        assert!(NOTES_INSTRUCTIONS.contains("developerNote"));
        assert!(NOTES_INSTRUCTIONS.contains("marketingNote"));
    }

    #[test]
    fn test_instructions_forbid_fabrication_and_extra_text() {
        assert!(NOTES_INSTRUCTIONS.contains("Never invent"));
        assert!(NOTES_INSTRUCTIONS.contains("JSON object only"));
        assert!(NOTES_INSTRUCTIONS.contains("empty string"));
        assert!(NOTES_INSTRUCTIONS.contains("two sentences"));
    }

    #[test]
    fn test_notes_input_includes_all_request_parts() {
        let input = notes_input(&sample_request());
        assert!(input.contains("#42"));
        assert!(input.contains("Fix stale cache reads"));
        assert!(input.contains("+++ b/cache.rs"));
    }

    #[test]
    fn test_notes_input_shape() {
        let input = notes_input(&sample_request());
        assert!(input.starts_with("Pull request #42:"));
        assert!(input.contains("\n\nDiff:\n"));
    }
}
