//! `GET /health` handler

use super::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Health check response structure
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when at least one provider key is configured,
    /// `degraded` otherwise
    pub status: String,
    /// Crate version
    pub version: String,
    /// Which provider API keys are present
    pub api_keys: ApiKeyHealth,
    /// Response cache state
    pub cache: CacheHealth,
    /// Catalog summary
    pub models: ModelHealth,
}

/// Presence of each provider API key
#[derive(Debug, Serialize)]
pub struct ApiKeyHealth {
    /// OpenAI key configured
    pub openai: bool,
    /// Anthropic key configured
    pub anthropic: bool,
    /// Gemini key configured
    pub gemini: bool,
    /// Groq key configured
    pub groq: bool,
    /// `OpenRouter` key configured
    pub openrouter: bool,
}

/// Response cache counters
#[derive(Debug, Serialize)]
pub struct CacheHealth {
    /// Whether caching is active
    pub enabled: bool,
    /// Entries currently cached
    pub entries: u64,
    /// Lookups served from cache
    pub hits: u64,
    /// Lookups that fell through
    pub misses: u64,
}

/// Catalog summary for health reporting
#[derive(Debug, Serialize)]
pub struct ModelHealth {
    /// Models in the catalog
    pub total: usize,
    /// Model count per tier name
    pub by_tier: HashMap<&'static str, usize>,
}

/// Report service readiness and dependency state
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("Health check requested");

    let settings = &state.settings;
    let cache = state.router.cache();
    let catalog = state.router.catalog();

    let status = if settings.any_provider_configured() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        api_keys: ApiKeyHealth {
            openai: settings.openai_api_key.is_some(),
            anthropic: settings.anthropic_api_key.is_some(),
            gemini: settings.gemini_api_key.is_some(),
            groq: settings.groq_api_key.is_some(),
            openrouter: settings.openrouter_api_key.is_some(),
        },
        cache: CacheHealth {
            enabled: cache.enabled(),
            entries: cache.entry_count(),
            hits: cache.hit_count(),
            misses: cache.miss_count(),
        },
        models: ModelHealth {
            total: catalog.len(),
            by_tier: catalog.count_by_tier(),
        },
    })
}
