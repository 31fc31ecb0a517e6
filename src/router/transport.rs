//! Transport seam between routing policy and provider adapters
//!
//! The router only sees this trait; tests inject scripted transports,
//! production wires in [`ProviderTransport`] over the configured
//! provider set.

use super::types::ModelDescriptor;
use crate::llm::{LlmError, Message, ProviderReply, ProviderSet};
use async_trait::async_trait;

/// One chat-completion attempt against a concrete model
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Execute the request against the model's provider
    async fn complete(
        &self,
        model: &ModelDescriptor,
        messages: &[Message],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, LlmError>;
}

/// Production transport dispatching to the provider owning each model
pub struct ProviderTransport {
    providers: ProviderSet,
}

impl ProviderTransport {
    /// Wrap a provider set
    #[must_use]
    pub const fn new(providers: ProviderSet) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl CompletionTransport for ProviderTransport {
    async fn complete(
        &self,
        model: &ModelDescriptor,
        messages: &[Message],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, LlmError> {
        // An unconfigured provider is an ordinary attempt failure, so the
        // fallback chain can route around it.
        let provider = self.providers.get(model.provider)?;
        provider
            .chat_completion(messages, &model.name, max_tokens, temperature)
            .await
    }
}
