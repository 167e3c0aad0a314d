//! AI Response Extractor: turns a chat-completion envelope into a [`Roadmap`].
//!
//! Models wrap JSON in prose and markdown fences more often than not, so the payload is
//! taken from the first fenced block when one exists. Nothing is retried or repaired:
//! text that does not parse is reported with the raw content attached.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::roadmap::models::{Roadmap, RoadmapShape};

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The envelope has no usable `choices[0].message.content`.
    #[error("completion envelope has no message content")]
    InvalidResponse { raw: Value },

    #[error("{reason}")]
    ParseFailure { reason: String, raw: String },
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::InvalidResponse { raw } => AppError::AiInvalidResponse { raw },
            ExtractError::ParseFailure { reason, raw } => AppError::AiParseFailure { reason, raw },
        }
    }
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("fence pattern is valid")
    })
}

/// Returns the inner content of the first fenced block (```` ```json ```` or bare ```` ``` ````),
/// or the whole text unchanged when there is no complete fence.
pub fn extract_payload(text: &str) -> &str {
    fence_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str())
}

/// Pulls the completion text out of a `{choices:[{message:{content}}]}` envelope.
pub fn completion_text(envelope: &Value) -> Option<&str> {
    envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// Parses raw completion text into a roadmap. On failure the error carries `text` as-is.
pub fn parse_roadmap_text(text: &str) -> Result<Roadmap, ExtractError> {
    let payload = extract_payload(text);

    let failure = |reason: String| ExtractError::ParseFailure {
        reason,
        raw: text.to_string(),
    };

    let value: Value =
        serde_json::from_str(payload).map_err(|e| failure(format!("invalid JSON: {e}")))?;
    let roadmap = Roadmap::from_value(value).map_err(|e| failure(e.to_string()))?;

    if roadmap.shape() != RoadmapShape::Branching {
        warn!(
            "AI roadmap parsed as {:?} rather than a branching roadmap",
            roadmap.shape()
        );
    }
    Ok(roadmap)
}

/// Full extraction: envelope check first, then payload extraction and parsing.
pub fn parse_completion(envelope: Value) -> Result<Roadmap, ExtractError> {
    let Some(text) = completion_text(&envelope) else {
        return Err(ExtractError::InvalidResponse { raw: envelope });
    };
    debug!("Raw AI response: {text}");
    parse_roadmap_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ROADMAP_JSON: &str = r#"[
        { "id": "A", "label": "Start", "next": [{ "id": "B", "label": "Option 1" }, { "id": "C" }] },
        { "id": "B", "label": "Step 1" },
        { "id": "C", "label": "Step 2" }
    ]"#;

    fn envelope(content: &str) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[test]
    fn test_extract_payload_json_fence() {
        let text = "Here is your roadmap:\n```json\n[1, 2]\n```\nGood luck!";
        assert_eq!(extract_payload(text), "[1, 2]");
    }

    #[test]
    fn test_extract_payload_bare_fence() {
        assert_eq!(extract_payload("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_payload_tag_is_case_insensitive() {
        assert_eq!(extract_payload("```JSON\n[]\n```"), "[]");
        assert_eq!(extract_payload("```Json []```"), "[]");
    }

    #[test]
    fn test_extract_payload_takes_first_block_only() {
        let text = "```json\n[\"first\"]\n```\nand\n```json\n[\"second\"]\n```";
        assert_eq!(extract_payload(text), "[\"first\"]");
    }

    #[test]
    fn test_extract_payload_without_fence_is_unchanged() {
        let text = "  [\"plain\"]  ";
        assert_eq!(extract_payload(text), text);
        // An unterminated fence is not a block.
        let open_only = "```json\n[1]";
        assert_eq!(extract_payload(open_only), open_only);
    }

    #[test]
    fn test_fenced_and_unwrapped_payload_parse_identically() {
        let fenced = format!("Sure! Here it is.\n```json\n{ROADMAP_JSON}\n```\nEnjoy.");
        let from_fence = parse_roadmap_text(&fenced).unwrap();
        let from_plain = parse_roadmap_text(ROADMAP_JSON).unwrap();
        assert_eq!(from_fence, from_plain);
        assert_eq!(from_fence.shape(), RoadmapShape::Branching);
        assert_eq!(from_fence.len(), 3);
    }

    #[test]
    fn test_unparseable_text_carries_raw_text_unchanged() {
        let text = "I'm sorry, I can't produce a roadmap for that.";
        match parse_roadmap_text(text) {
            Err(ExtractError::ParseFailure { raw, .. }) => assert_eq!(raw, text),
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_inside_fence_reports_full_raw_text() {
        let text = "```json\n[{ \"id\": \"A\", \"label\": \"Start\", }\n```";
        match parse_roadmap_text(text) {
            Err(ExtractError::ParseFailure { raw, reason }) => {
                assert_eq!(raw, text);
                assert!(reason.starts_with("invalid JSON"));
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn test_parseable_but_unrecognized_json_is_parse_failure() {
        let err = parse_roadmap_text(r#"{"roadmap": []}"#).unwrap_err();
        assert!(matches!(err, ExtractError::ParseFailure { .. }));
    }

    #[test]
    fn test_garbage_but_well_shaped_json_is_accepted() {
        let roadmap =
            parse_roadmap_text(r#"[{"id": "A", "label": "A", "next": [{"id": "nowhere"}]}]"#)
                .unwrap();
        assert_eq!(roadmap.len(), 1);
    }

    #[test]
    fn test_null_next_is_accepted_as_no_edges() {
        let roadmap = parse_roadmap_text(
            r#"[{"id":"A","label":"Start","next":null},{"id":"B","label":"End"}]"#,
        )
        .unwrap();
        let Roadmap::Branching(nodes) = roadmap else {
            panic!("expected branching roadmap");
        };
        assert!(nodes[0].next.is_empty());
    }

    #[test]
    fn test_free_form_dates_are_accepted() {
        let roadmap = parse_roadmap_text(
            r#"[{"stepId":1,"title":"Learn","startDate":"Q1 2024","endDate":"Spring"}]"#,
        )
        .unwrap();
        assert_eq!(roadmap.shape(), RoadmapShape::Sequential);
        assert_eq!(
            serde_json::to_value(&roadmap).unwrap()[0]["startDate"],
            "Q1 2024"
        );
    }

    #[test]
    fn test_parse_completion_reads_envelope_content() {
        let roadmap = parse_completion(envelope(ROADMAP_JSON)).unwrap();
        assert_eq!(roadmap.shape(), RoadmapShape::Branching);
    }

    #[test]
    fn test_parse_completion_without_choices_is_invalid_response() {
        let raw = json!({ "error": { "message": "rate limited" } });
        match parse_completion(raw.clone()) {
            Err(ExtractError::InvalidResponse { raw: got }) => assert_eq!(got, raw),
            other => panic!("expected invalid response, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_completion_with_empty_content_is_invalid_response() {
        let err = parse_completion(envelope("")).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidResponse { .. }));

        let err = parse_completion(json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidResponse { .. }));
    }
}
