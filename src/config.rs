use std::time::Duration;

use crate::agent::DEFAULT_MODEL;
use crate::errors::AppError;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Runtime settings read from the environment (and `.env` in development).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub ollama_base_url: String,
    pub model: String,
    pub port: u16,
    pub generation_timeout: Duration,
    /// Live sessions idle longer than this are evicted.
    pub session_ttl: Duration,
    pub cors_allow_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::MissingConfig { key: "DATABASE_URL".to_string() })?;

        let timeout_secs = positive_secs(&lookup, "GENERATION_TIMEOUT_SECS")
            .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS);
        let ttl_secs =
            positive_secs(&lookup, "SESSION_TTL_SECS").unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Ok(Self {
            database_url,
            ollama_base_url: lookup("OLLAMA_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            model: lookup("STORY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            generation_timeout: Duration::from_secs(timeout_secs),
            session_ttl: Duration::from_secs(ttl_secs),
            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN").filter(|v| !v.trim().is_empty()),
        })
    }
}

fn positive_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    lookup(key)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
}
