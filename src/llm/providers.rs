//! Per-provider transport adapters
//!
//! Each adapter builds the vendor-specific request and maps the raw
//! payload into the normalized [`ProviderReply`](super::ProviderReply).

use super::http_utils::{self, extract_text_content, send_json_request};
use super::{bare_model_id, LlmError, LlmProvider, Message, ProviderReply, TokenUsage};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;
use std::time::Duration;

/// LLM provider implementation for OpenAI
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance
    #[must_use]
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat_completion(
        &self,
        messages: &[Message],
        model_id: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, LlmError> {
        super::openai_compat::chat_completion(
            &self.client,
            messages,
            bare_model_id(model_id),
            max_tokens,
            temperature,
        )
        .await
    }
}

/// LLM provider implementation for Groq
pub struct GroqProvider {
    client: Client<OpenAIConfig>,
}

impl GroqProvider {
    /// Create a new Groq provider instance
    #[must_use]
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base("https://api.groq.com/openai/v1");
        Self {
            client: Client::with_config(config),
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn chat_completion(
        &self,
        messages: &[Message],
        model_id: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, LlmError> {
        super::openai_compat::chat_completion(
            &self.client,
            messages,
            bare_model_id(model_id),
            max_tokens,
            temperature,
        )
        .await
    }
}

#[derive(serde::Deserialize, Debug)]
struct AnthropicContentBlock {
    text: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(serde::Deserialize, Debug)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    usage: Option<AnthropicUsage>,
}

/// LLM provider implementation for Anthropic
pub struct AnthropicProvider {
    http_client: HttpClient,
    api_key: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider instance
    #[must_use]
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            http_client: http_utils::create_http_client(timeout),
            api_key,
        }
    }

    /// Split system messages out of the conversation, as the Anthropic
    /// messages API takes the system prompt as a separate field.
    fn prepare_messages(messages: &[Message]) -> (String, Vec<serde_json::Value>) {
        let mut system = String::new();
        let mut conversation = Vec::new();

        for msg in messages {
            if msg.role == "system" {
                if !system.is_empty() {
                    system.push('\n');
                }
                system.push_str(&msg.content);
            } else {
                conversation.push(json!({
                    "role": msg.role,
                    "content": msg.content
                }));
            }
        }

        (system, conversation)
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn chat_completion(
        &self,
        messages: &[Message],
        model_id: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, LlmError> {
        let (system, conversation) = Self::prepare_messages(messages);

        let mut body = json!({
            "model": bare_model_id(model_id),
            "max_tokens": max_tokens,
            "temperature": temperature,
            "messages": conversation
        });
        if !system.is_empty() {
            body["system"] = json!(system);
        }

        let res_json = send_json_request(
            &self.http_client,
            "https://api.anthropic.com/v1/messages",
            &body,
            None,
            &[
                ("x-api-key", self.api_key.as_str()),
                ("anthropic-version", "2023-06-01"),
            ],
        )
        .await?;

        let parsed: AnthropicResponse =
            serde_json::from_value(res_json).map_err(|e| LlmError::JsonError(e.to_string()))?;

        let content = parsed
            .content
            .first()
            .and_then(|block| block.text.clone())
            .ok_or_else(|| LlmError::ApiError("Empty response".to_string()))?;

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens + u.output_tokens,
        });

        Ok(ProviderReply { content, usage })
    }
}

/// LLM provider implementation for Google Gemini
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    #[must_use]
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            http_client: http_utils::create_http_client(timeout),
            api_key,
        }
    }

    fn parse_usage(res_json: &serde_json::Value) -> Option<TokenUsage> {
        let metadata = res_json.get("usageMetadata")?;
        let prompt = metadata.get("promptTokenCount")?.as_u64()?;
        let completion = metadata
            .get("candidatesTokenCount")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        let total = metadata
            .get("totalTokenCount")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(prompt + completion);
        Some(TokenUsage {
            prompt_tokens: u32::try_from(prompt).unwrap_or(u32::MAX),
            completion_tokens: u32::try_from(completion).unwrap_or(u32::MAX),
            total_tokens: u32::try_from(total).unwrap_or(u32::MAX),
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn chat_completion(
        &self,
        messages: &[Message],
        model_id: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, LlmError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            bare_model_id(model_id),
            self.api_key
        );

        let mut system_parts = Vec::new();
        let mut contents = Vec::new();
        for msg in messages {
            if msg.role == "system" {
                system_parts.push(json!({"text": msg.content}));
            } else {
                let role = if msg.role == "user" { "user" } else { "model" };
                contents.push(json!({
                    "role": role,
                    "parts": [{"text": msg.content}]
                }));
            }
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_tokens
            }
        });
        if !system_parts.is_empty() {
            body["system_instruction"] = json!({ "parts": system_parts });
        }

        let res_json = send_json_request(&self.http_client, &url, &body, None, &[]).await?;
        let content = extract_text_content(
            &res_json,
            &["candidates", "0", "content", "parts", "0", "text"],
        )?;

        Ok(ProviderReply {
            content,
            usage: Self::parse_usage(&res_json),
        })
    }
}

/// LLM provider implementation for `OpenRouter`
pub struct OpenRouterProvider {
    http_client: HttpClient,
    api_key: String,
    site_url: String,
    site_name: String,
}

impl OpenRouterProvider {
    /// Create a new `OpenRouter` provider instance
    #[must_use]
    pub fn new(api_key: String, site_url: String, site_name: String, timeout: Duration) -> Self {
        Self {
            http_client: http_utils::create_http_client(timeout),
            api_key,
            site_url,
            site_name,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn chat_completion(
        &self,
        messages: &[Message],
        model_id: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, LlmError> {
        let url = "https://openrouter.ai/api/v1/chat/completions";

        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();

        // OpenRouter routes by the fully-qualified "vendor/model" name
        let body = json!({
            "model": model_id,
            "messages": api_messages,
            "max_tokens": max_tokens,
            "temperature": temperature
        });

        let mut extra_headers = Vec::new();
        if !self.site_url.is_empty() {
            extra_headers.push(("HTTP-Referer", self.site_url.as_str()));
        }
        if !self.site_name.is_empty() {
            extra_headers.push(("X-Title", self.site_name.as_str()));
        }

        let auth = format!("Bearer {}", self.api_key);
        let res_json =
            send_json_request(&self.http_client, url, &body, Some(&auth), &extra_headers).await?;

        let content = extract_text_content(&res_json, &["choices", "0", "message", "content"])?;
        let usage = res_json
            .get("usage")
            .cloned()
            .and_then(|u| serde_json::from_value::<TokenUsage>(u).ok());

        Ok(ProviderReply { content, usage })
    }
}
