//! Axum route handler for free-form chat.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::debug;

use crate::chat::models::{ChatRequest, ChatResponse};
use crate::chat::transport::send_message;
use crate::errors::{AppError, MESSAGE_REQUIRED};
use crate::state::AppState;

/// POST /api/chat
///
/// Forwards one user message plus prior turns to the completion service.
/// A missing body, malformed JSON, or blank message is a 400.
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected chat body: {rejection}");
            return Err(AppError::Validation(MESSAGE_REQUIRED.to_string()));
        }
    };

    // Whitespace-only input counts as no message.
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::Validation(MESSAGE_REQUIRED.to_string()))?;

    let reply = send_message(state.llm.as_ref(), &message, &request.messages).await?;

    Ok(Json(ChatResponse {
        message: reply,
        model: state.llm.model().to_string(),
    }))
}
