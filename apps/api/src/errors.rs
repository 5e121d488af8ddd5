use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chat::transport::user_facing_message;
use crate::hearing::HearingError;
use crate::llm_client::LlmError;

/// Fixed text returned when the chat endpoint receives no message.
pub const MESSAGE_REQUIRED: &str = "メッセージが必要です";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{ "error": "<text>" }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Hearing error: {0}")]
    Hearing(#[from] HearingError),

    #[error("Completion error: {0}")]
    Completion(#[from] LlmError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Hearing(e) => {
                let status = if e.is_conflict() {
                    StatusCode::CONFLICT
                } else {
                    StatusCode::BAD_REQUEST
                };
                (status, e.to_string())
            }
            AppError::Completion(e) => {
                // Operators see the provider text; users only the mapped message.
                tracing::error!("Completion error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    user_facing_message(e).to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
