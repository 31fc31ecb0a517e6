//! Configuration and settings management
//!
//! Loads settings from environment variables and optional config files.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

const fn default_cache_ttl_secs() -> u64 {
    3600
}

const fn default_cache_max_entries() -> u64 {
    10_000
}

const fn default_cache_enabled() -> bool {
    true
}

const fn default_llm_http_timeout_secs() -> u64 {
    120
}

const fn default_llm_retry_attempts() -> usize {
    3
}

const fn default_llm_retry_base_ms() -> u64 {
    2000
}

const fn default_llm_retry_max_ms() -> u64 {
    30_000
}

const fn default_openrouter_site_url() -> String {
    String::new()
}

fn default_openrouter_site_name() -> String {
    "Oxide Router".to_string()
}

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// Anthropic API key
    pub anthropic_api_key: Option<String>,
    /// Gemini API key
    pub gemini_api_key: Option<String>,
    /// Groq API key
    pub groq_api_key: Option<String>,
    /// `OpenRouter` API key
    pub openrouter_api_key: Option<String>,

    /// Socket address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Response cache time-to-live in seconds; zero disables caching
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Maximum number of cached responses
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,
    /// Master switch for the response cache
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// Hard timeout per provider HTTP request, in seconds
    #[serde(default = "default_llm_http_timeout_secs")]
    pub llm_http_timeout_secs: u64,
    /// Tries per model for transient errors, including the first
    #[serde(default = "default_llm_retry_attempts")]
    pub llm_retry_attempts: usize,
    /// Initial retry backoff in milliseconds
    #[serde(default = "default_llm_retry_base_ms")]
    pub llm_retry_base_ms: u64,
    /// Retry backoff ceiling in milliseconds
    #[serde(default = "default_llm_retry_max_ms")]
    pub llm_retry_max_ms: u64,

    /// Site URL for `OpenRouter` identification
    #[serde(default = "default_openrouter_site_url")]
    pub openrouter_site_url: String,
    /// Site name for `OpenRouter` identification
    #[serde(default = "default_openrouter_site_name")]
    pub openrouter_site_name: String,
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of APP)
            // try_parsing lets numeric knobs like APP__CACHE_TTL_SECS deserialize
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Also add settings from environment variables directly (without prefix)
            // Note: Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true).try_parsing(true))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        // Fallback: check environment variables directly if config didn't
        // pick them up; automatic mapping differs across config versions
        Self::env_fallback(&mut settings.openai_api_key, "OPENAI_API_KEY");
        Self::env_fallback(&mut settings.anthropic_api_key, "ANTHROPIC_API_KEY");
        Self::env_fallback(&mut settings.gemini_api_key, "GEMINI_API_KEY");
        Self::env_fallback(&mut settings.groq_api_key, "GROQ_API_KEY");
        Self::env_fallback(&mut settings.openrouter_api_key, "OPENROUTER_API_KEY");

        Ok(settings)
    }

    fn env_fallback(field: &mut Option<String>, var: &str) {
        if field.is_none() {
            if let Ok(val) = std::env::var(var) {
                if !val.is_empty() {
                    *field = Some(val);
                }
            }
        }
    }

    /// Per-request provider timeout as a `Duration`
    #[must_use]
    pub const fn llm_http_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_http_timeout_secs)
    }

    /// Whether at least one provider API key is configured
    #[must_use]
    pub const fn any_provider_configured(&self) -> bool {
        self.openai_api_key.is_some()
            || self.anthropic_api_key.is_some()
            || self.gemini_api_key.is_some()
            || self.groq_api_key.is_some()
            || self.openrouter_api_key.is_some()
    }
}
