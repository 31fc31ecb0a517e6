//! OpenAI-compatible provider utilities
//!
//! Shared implementation for providers using the async-openai client
//! (OpenAI, Groq) which differ only in base URL.

use super::{LlmError, Message, ProviderReply, TokenUsage};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};

/// Build a list of chat messages for OpenAI-compatible APIs
///
/// # Errors
///
/// Returns `LlmError::Unknown` if message building fails.
pub fn build_openai_messages(
    messages: &[Message],
) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
    let mut out = Vec::with_capacity(messages.len());

    for msg in messages {
        let m = match msg.role.as_str() {
            "system" => ChatCompletionRequestSystemMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map_err(|e| LlmError::Unknown(e.to_string()))?
                .into(),
            "assistant" => ChatCompletionRequestAssistantMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map_err(|e| LlmError::Unknown(e.to_string()))?
                .into(),
            _ => ChatCompletionRequestUserMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map_err(|e| LlmError::Unknown(e.to_string()))?
                .into(),
        };
        out.push(m);
    }

    Ok(out)
}

/// Perform a chat completion using an OpenAI-compatible API
///
/// Shared by the OpenAI and Groq providers, which use the same
/// async-openai client with different base URLs.
///
/// # Errors
///
/// Returns `LlmError::ApiError` when the API call fails or the response
/// carries no content.
pub async fn chat_completion(
    client: &Client<OpenAIConfig>,
    messages: &[Message],
    model_id: &str,
    max_tokens: u32,
    temperature: f32,
) -> Result<ProviderReply, LlmError> {
    let messages = build_openai_messages(messages)?;

    let request = CreateChatCompletionRequestArgs::default()
        .model(model_id)
        .messages(messages)
        .max_tokens(max_tokens)
        .temperature(temperature)
        .build()
        .map_err(|e| LlmError::Unknown(e.to_string()))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| LlmError::ApiError(e.to_string()))?;

    let content = response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or_else(|| LlmError::ApiError("Empty response".to_string()))?;

    let usage = response.usage.as_ref().map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(ProviderReply { content, usage })
}
