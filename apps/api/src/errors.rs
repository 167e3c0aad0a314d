use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing input: {0}")]
    InputMissing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The completion envelope had no usable `choices[0].message.content`.
    #[error("AI API did not return a valid response")]
    AiInvalidResponse { raw: Value },

    /// The completion text could not be turned into a roadmap.
    #[error("Failed to parse roadmap: {reason}")]
    AiParseFailure { reason: String, raw: String },

    #[error("Failed to fetch roadmap: {0}")]
    AiTransport(String),
}

impl AppError {
    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InputMissing(_) => "INPUT_MISSING",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AiInvalidResponse { .. } => "AI_INVALID_RESPONSE",
            AppError::AiParseFailure { .. } => "AI_PARSE_FAILURE",
            AppError::AiTransport(_) => "AI_TRANSPORT_FAILURE",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, body) = match self {
            AppError::InputMissing(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg, "code": code }),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "error": msg, "code": code }),
            ),
            AppError::AiInvalidResponse { raw } => {
                tracing::error!("AI API did not return expected choices/message/content: {raw}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "AI API did not return a valid response",
                        "code": code,
                        "raw": raw
                    }),
                )
            }
            AppError::AiParseFailure { reason, raw } => {
                tracing::error!("Failed to parse roadmap: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Failed to parse roadmap",
                        "code": code,
                        "raw": raw
                    }),
                )
            }
            AppError::AiTransport(details) => {
                tracing::error!("Failed to fetch roadmap: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Failed to fetch roadmap",
                        "code": code,
                        "details": details
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_body_carries_plain_error_string() {
        let response = AppError::NotFound("Job not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Job not found");
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_input_missing_is_bad_request() {
        let response =
            AppError::InputMissing("Job title is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_parse_failure_returns_raw_text() {
        let response = AppError::AiParseFailure {
            reason: "expected value".to_string(),
            raw: "not json at all".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to parse roadmap");
        assert_eq!(body["raw"], "not json at all");
    }

    #[tokio::test]
    async fn test_invalid_response_returns_envelope_as_raw() {
        let envelope = json!({ "error": { "message": "quota exceeded" } });
        let response = AppError::AiInvalidResponse {
            raw: envelope.clone(),
        }
        .into_response();

        let body = body_json(response).await;
        assert_eq!(body["code"], "AI_INVALID_RESPONSE");
        assert_eq!(body["raw"], envelope);
    }

    #[test]
    fn test_every_kind_has_its_code() {
        let cases = [
            (AppError::InputMissing(String::new()), "INPUT_MISSING"),
            (AppError::NotFound(String::new()), "NOT_FOUND"),
            (AppError::AiInvalidResponse { raw: Value::Null }, "AI_INVALID_RESPONSE"),
            (
                AppError::AiParseFailure {
                    reason: String::new(),
                    raw: String::new(),
                },
                "AI_PARSE_FAILURE",
            ),
            (AppError::AiTransport(String::new()), "AI_TRANSPORT_FAILURE"),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
        }
    }

    #[tokio::test]
    async fn test_transport_failure_reports_details() {
        let response = AppError::AiTransport("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to fetch roadmap");
        assert_eq!(body["details"], "connection refused");
    }
}
