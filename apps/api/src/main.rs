mod chat;
mod config;
mod errors;
mod hearing;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::hearing::store::spawn_eviction;
use crate::hearing::{SessionStore, StepCatalog};
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting travel API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let llm = GeminiClient::new(config.gemini_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build and validate the hearing flow once
    let catalog = StepCatalog::travel().context("hearing step catalog is invalid")?;
    info!(
        "Hearing catalog loaded: {} steps ({} answerable)",
        catalog.len(),
        catalog.total_steps()
    );

    // Reclaim abandoned hearing sessions in the background
    let sessions = SessionStore::with_ttl(config.hearing_session_ttl);
    spawn_eviction(sessions.clone(), config.hearing_session_ttl / 2);

    let state = AppState {
        llm: Arc::new(llm),
        catalog: Arc::new(catalog),
        sessions,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
