//! LLM provider integration module
//!
//! Normalizes five provider APIs behind one [`LlmProvider`] trait so the
//! router can treat every model attempt uniformly.

pub mod http_utils;
pub mod openai_compat;
pub mod providers;

use crate::config::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when interacting with LLM providers
#[derive(Error, Debug)]
pub enum LlmError {
    /// The provider returned a non-success status or malformed payload
    #[error("API error: {0}")]
    ApiError(String),

    /// Connectivity failure before a response was received
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The request deadline elapsed
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The provider returned HTTP 429
    #[error("Rate limited: {message}")]
    RateLimit {
        /// Seconds from the `Retry-After` header, when present
        wait_secs: Option<u64>,
        /// Raw body returned with the 429
        message: String,
    },

    /// Response body could not be parsed as the expected JSON shape
    #[error("JSON parsing error: {0}")]
    JsonError(String),

    /// No API key configured for the provider owning the model
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// Catch-all for errors outside the taxonomy above
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl LlmError {
    /// Whether retrying the same model can plausibly succeed.
    ///
    /// Rate limits, timeouts and network failures are transient by
    /// definition. API errors are transient only when the message looks
    /// like a server-side fault (5xx, overloaded, unavailable).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimit { .. } | Self::Timeout(_) | Self::NetworkError(_) => true,
            Self::ApiError(msg) => {
                let lower = msg.to_lowercase();
                lower.contains("500")
                    || lower.contains("502")
                    || lower.contains("503")
                    || lower.contains("504")
                    || lower.contains("overloaded")
                    || lower.contains("unavailable")
            }
            Self::JsonError(_) | Self::MissingConfig(_) | Self::Unknown(_) => false,
        }
    }
}

/// A single chat message with a role and content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// One of `system`, `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
}

/// Token counts reported by a provider for one completion
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens generated in the reply
    #[serde(default)]
    pub completion_tokens: u32,
    /// Prompt plus completion tokens
    #[serde(default)]
    pub total_tokens: u32,
}

/// Normalized provider response
#[derive(Debug, Clone)]
pub struct ProviderReply {
    /// Generated text
    pub content: String,
    /// Token accounting, when the provider reports it
    pub usage: Option<TokenUsage>,
}

/// The vendors a model can be served by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions API
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// Google Gemini `generateContent` API
    Google,
    /// Groq OpenAI-compatible API
    Groq,
    /// `OpenRouter` aggregation API
    OpenRouter,
}

impl ProviderKind {
    /// Stable lowercase identifier used in logs and API payloads
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Groq => "groq",
            Self::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strips an `OpenRouter`-style `vendor/` prefix from a model id.
///
/// Native provider APIs take the bare model name while `OpenRouter`
/// routes by the fully-qualified one.
#[must_use]
pub fn bare_model_id(model_id: &str) -> &str {
    model_id
        .split_once('/')
        .map_or(model_id, |(_, bare)| bare)
}

/// Trait for LLM provider implementations
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one chat completion against `model_id`
    async fn chat_completion(
        &self,
        messages: &[Message],
        model_id: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, LlmError>;
}

/// The providers instantiated from configured API keys
pub struct ProviderSet {
    providers: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
}

impl ProviderSet {
    /// Build adapters for every provider with an API key in `settings`
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let timeout = settings.llm_http_timeout();
        let mut providers: HashMap<ProviderKind, Arc<dyn LlmProvider>> = HashMap::new();

        if let Some(key) = &settings.openai_api_key {
            providers.insert(
                ProviderKind::OpenAi,
                Arc::new(providers::OpenAiProvider::new(key.clone())),
            );
        }
        if let Some(key) = &settings.anthropic_api_key {
            providers.insert(
                ProviderKind::Anthropic,
                Arc::new(providers::AnthropicProvider::new(key.clone(), timeout)),
            );
        }
        if let Some(key) = &settings.gemini_api_key {
            providers.insert(
                ProviderKind::Google,
                Arc::new(providers::GeminiProvider::new(key.clone(), timeout)),
            );
        }
        if let Some(key) = &settings.groq_api_key {
            providers.insert(
                ProviderKind::Groq,
                Arc::new(providers::GroqProvider::new(key.clone())),
            );
        }
        if let Some(key) = &settings.openrouter_api_key {
            providers.insert(
                ProviderKind::OpenRouter,
                Arc::new(providers::OpenRouterProvider::new(
                    key.clone(),
                    settings.openrouter_site_url.clone(),
                    settings.openrouter_site_name.clone(),
                    timeout,
                )),
            );
        }

        Self { providers }
    }

    /// Look up the adapter for a provider.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingConfig` when no API key was configured
    /// for `kind`.
    pub fn get(&self, kind: ProviderKind) -> Result<&Arc<dyn LlmProvider>, LlmError> {
        self.providers
            .get(&kind)
            .ok_or_else(|| LlmError::MissingConfig(format!("no API key for provider {kind}")))
    }

    /// Whether an adapter exists for `kind`
    #[must_use]
    pub fn configured(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_transient() {
        let err = LlmError::RateLimit {
            wait_secs: Some(5),
            message: "slow down".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn server_fault_api_errors_are_transient() {
        assert!(LlmError::ApiError("API error: 503 Service Unavailable".into()).is_transient());
        assert!(LlmError::ApiError("model overloaded, try later".into()).is_transient());
    }

    #[test]
    fn client_errors_are_terminal() {
        assert!(!LlmError::ApiError("API error: 400 - bad request".into()).is_transient());
        assert!(!LlmError::MissingConfig("no key".into()).is_transient());
        assert!(!LlmError::JsonError("eof".into()).is_transient());
    }

    #[test]
    fn bare_model_id_strips_vendor_prefix() {
        assert_eq!(bare_model_id("deepseek/deepseek-chat"), "deepseek-chat");
        assert_eq!(bare_model_id("gpt-4o-mini"), "gpt-4o-mini");
    }
}
