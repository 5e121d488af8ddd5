use std::sync::Arc;

use crate::hearing::{SessionStore, StepCatalog};
use crate::llm_client::CompletionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Default: GeminiClient; tests use a recording fake.
    pub llm: Arc<dyn CompletionService>,
    /// Validated hearing flow, built once at startup.
    pub catalog: Arc<StepCatalog>,
    /// Live hearing sessions, keyed by session id.
    pub sessions: SessionStore,
}
