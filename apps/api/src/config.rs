use std::time::Duration;

use anyhow::{Context, Result};

use crate::hearing::store::DEFAULT_SESSION_TTL;

/// Application configuration loaded from environment variables.
/// Fails at startup if the completion credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Idle time before an abandoned hearing session is reclaimed.
    pub hearing_session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            hearing_session_ttl: session_ttl_from_env()?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn session_ttl_from_env() -> Result<Duration> {
    let Ok(raw) = std::env::var("HEARING_SESSION_TTL_SECS") else {
        return Ok(DEFAULT_SESSION_TTL);
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => anyhow::bail!("HEARING_SESSION_TTL_SECS must be a positive number of seconds"),
    }
}
