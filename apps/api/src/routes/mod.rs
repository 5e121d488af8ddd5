pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::hearing::handlers as hearing;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Free-form chat
        .route("/api/chat", post(chat::handle_chat))
        // Guided hearing
        .route("/api/hearing", post(hearing::handle_start))
        .route("/api/hearing/:id", get(hearing::handle_get))
        .route("/api/hearing/:id/select", post(hearing::handle_select))
        .route("/api/hearing/:id/toggle", post(hearing::handle_toggle))
        .route("/api/hearing/:id/proceed", post(hearing::handle_proceed))
        .route("/api/hearing/:id/skip", post(hearing::handle_skip))
        .route("/api/hearing/:id/confirm", post(hearing::handle_confirm))
        .with_state(state)
}
