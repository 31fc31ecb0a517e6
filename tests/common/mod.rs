//! Shared fixtures: scripted transports and catalog builders

#![allow(dead_code)]

use async_trait::async_trait;
use oxide_router::llm::{LlmError, Message, ProviderKind, ProviderReply, TokenUsage};
use oxide_router::router::transport::CompletionTransport;
use oxide_router::router::types::{
    CompletionRequest, ModelDescriptor, ModelTier, TaskType,
};
use oxide_router::router::{RetryPolicy, RouterOptions};
use std::collections::HashMap;
use std::sync::Mutex;

/// What a scripted model does when attempted
#[derive(Clone)]
pub enum Script {
    /// Reply with this content and 100 total tokens
    Succeed(&'static str),
    /// Fail terminally with a non-transient API error
    Fail(&'static str),
}

/// Transport that executes a fixed per-model script and logs every call
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(scripts: &[(&str, Script)]) -> Self {
        Self {
            scripts: scripts
                .iter()
                .map(|(name, script)| ((*name).to_string(), script.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Model names in the order they were attempted
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().expect("call log lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("call log lock").len()
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn complete(
        &self,
        model: &ModelDescriptor,
        _messages: &[Message],
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<ProviderReply, LlmError> {
        self.calls
            .lock()
            .expect("call log lock")
            .push(model.name.clone());

        match self.scripts.get(&model.name) {
            Some(Script::Succeed(content)) => Ok(ProviderReply {
                content: (*content).to_string(),
                usage: Some(TokenUsage {
                    prompt_tokens: 60,
                    completion_tokens: 40,
                    total_tokens: 100,
                }),
            }),
            Some(Script::Fail(message)) => Err(LlmError::ApiError((*message).to_string())),
            None => Err(LlmError::ApiError(format!("unscripted model {}", model.name))),
        }
    }
}

pub fn model(name: &str, tier: ModelTier, cost: f64) -> ModelDescriptor {
    ModelDescriptor {
        name: name.to_string(),
        tier,
        cost_per_1m_tokens: cost,
        max_tokens: 8192,
        strengths: vec![TaskType::General, TaskType::Code],
        provider: ProviderKind::OpenRouter,
    }
}

/// Options with caching on and retries collapsed to a single attempt
pub fn fast_options() -> RouterOptions {
    RouterOptions {
        cache_ttl_secs: 3600,
        cache_max_entries: 1000,
        cache_enabled: true,
        retry: RetryPolicy {
            attempts: 1,
            base_delay_ms: 1,
            max_delay_ms: 1,
        },
    }
}

pub fn request(body: serde_json::Value) -> CompletionRequest {
    serde_json::from_value(body).expect("request parses")
}

pub fn user_message(content: &str) -> serde_json::Value {
    serde_json::json!({"messages": [{"role": "user", "content": content}]})
}
