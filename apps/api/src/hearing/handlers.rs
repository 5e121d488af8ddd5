//! Axum route handlers for the hearing flow.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::chat::models::{Conversation, Message};
use crate::chat::transport::send_message;
use crate::errors::AppError;
use crate::hearing::catalog::{Step, StepKind};
use crate::hearing::preferences::is_step_answered;
use crate::hearing::prompts::{summary, SummaryLine};
use crate::hearing::session::{HearingSession, Progress};
use crate::hearing::{HearingError, StepCatalog};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub value: String,
}

/// Everything the front end needs to render the current step.
#[derive(Debug, Serialize)]
pub struct HearingView {
    pub session: HearingSession,
    pub step: Step,
    pub progress: Progress,
    /// Whether the current step already holds what it needs.
    pub step_answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<SummaryLine>>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub prompt: String,
    pub message: String,
    pub model: String,
    pub messages: Conversation,
}

fn view(catalog: &StepCatalog, session: HearingSession) -> Result<HearingView, AppError> {
    let step = session.current_step(catalog)?.clone();
    let progress = session.progress(catalog);
    let step_answered = is_step_answered(&step.id, &session.preferences);
    let summary = (step.kind == StepKind::Confirmation).then(|| summary(&session.preferences));
    Ok(HearingView {
        session,
        step,
        progress,
        step_answered,
        summary,
    })
}

/// Unwraps an answer body, turning any extractor rejection into a 400.
fn answer(payload: Result<Json<AnswerRequest>, JsonRejection>) -> Result<AnswerRequest, AppError> {
    payload
        .map(|Json(req)| req)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Hearing session {id} not found"))
}

/// Applies one state-machine action and renders the resulting view.
async fn act<T>(
    state: &AppState,
    id: Uuid,
    action: impl FnOnce(&mut HearingSession, &StepCatalog) -> Result<T, HearingError>,
) -> Result<Json<HearingView>, AppError> {
    let catalog = state.catalog.as_ref();
    let (_, session) = state
        .sessions
        .update(id, |s| action(s, catalog))
        .await
        .ok_or_else(|| session_not_found(id))??;
    Ok(Json(view(catalog, session)?))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/hearing
///
/// Starts a new session at the welcome step.
pub async fn handle_start(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HearingView>), AppError> {
    let session = HearingSession::new(&state.catalog);
    state.sessions.insert(session.clone()).await;
    Ok((StatusCode::CREATED, Json(view(&state.catalog, session)?)))
}

/// GET /api/hearing/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HearingView>, AppError> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(view(&state.catalog, session)?))
}

/// POST /api/hearing/:id/select
///
/// Records a single-select answer and advances.
pub async fn handle_select(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<HearingView>, AppError> {
    let req = answer(payload)?;
    act(&state, id, |s, c| s.select(c, &req.value)).await
}

/// POST /api/hearing/:id/toggle
pub async fn handle_toggle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<HearingView>, AppError> {
    let req = answer(payload)?;
    act(&state, id, |s, c| s.toggle(c, &req.value)).await
}

/// POST /api/hearing/:id/proceed
pub async fn handle_proceed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HearingView>, AppError> {
    act(&state, id, |s, c| s.proceed(c)).await
}

/// POST /api/hearing/:id/skip
pub async fn handle_skip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HearingView>, AppError> {
    act(&state, id, |s, c| s.skip(c)).await
}

/// POST /api/hearing/:id/confirm
///
/// Completes the session, sends the compiled prompt as a fresh conversation,
/// and discards the session whatever the outcome.
pub async fn handle_confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let catalog = state.catalog.as_ref();
    let (prompt, _) = state
        .sessions
        .update(id, |s| s.confirm(catalog))
        .await
        .ok_or_else(|| session_not_found(id))??;

    // Discard before sending so a repeated confirm cannot issue a second request.
    state.sessions.remove(id).await;

    let mut messages = Conversation::new();
    let reply = send_message(state.llm.as_ref(), &prompt, &messages.turns()).await?;

    info!(session_id = %id, "Hearing plan generated");

    messages.push(Message::user(prompt.clone()));
    messages.push(Message::assistant(reply.clone()));

    Ok(Json(ConfirmResponse {
        prompt,
        message: reply,
        model: state.llm.model().to_string(),
        messages,
    }))
}
