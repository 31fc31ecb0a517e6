//! HTTP utilities for LLM providers
//!
//! Provides common HTTP request/response handling to eliminate
//! code duplication across provider implementations.

use crate::llm::LlmError;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;

/// Creates an HTTP client configured with the given request timeout.
///
/// A hard timeout prevents infinite hangs when a provider is slow or
/// unresponsive; timed-out attempts are treated as failures.
#[must_use]
pub fn create_http_client(timeout: Duration) -> HttpClient {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Parses a `Retry-After` header into whole seconds, when present.
#[must_use]
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Sends an HTTP POST request with JSON body and returns parsed JSON response.
///
/// This function handles:
/// - Sending the request with optional authorization and custom headers
/// - Checking the response status (429 becomes `LlmError::RateLimit`)
/// - Parsing the JSON response
///
/// # Errors
///
/// Returns `LlmError::Timeout` when the request deadline elapses,
/// `LlmError::NetworkError` on other connectivity issues,
/// `LlmError::ApiError` on non-success status codes, or
/// `LlmError::JsonError` if parsing fails.
pub async fn send_json_request(
    client: &HttpClient,
    url: &str,
    body: &Value,
    auth_header: Option<&str>,
    extra_headers: &[(&str, &str)],
) -> Result<Value, LlmError> {
    let mut request = client.post(url).json(body);

    if let Some(auth) = auth_header {
        request = request.header("Authorization", auth);
    }

    for (key, value) in extra_headers {
        request = request.header(*key, *value);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            LlmError::Timeout(e.to_string())
        } else {
            LlmError::NetworkError(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let wait_secs = parse_retry_after(response.headers());
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::RateLimit {
                wait_secs,
                message: error_text,
            });
        }

        let error_text = response.text().await.unwrap_or_default();

        // Detect HTML error pages from Nginx/proxies
        let is_html = error_text.trim_start().starts_with("<!DOCTYPE")
            || error_text.trim_start().starts_with("<html")
            || error_text.trim_start().starts_with("<HTML");

        let clean_message = if is_html {
            // Don't include raw HTML in error message
            format!("API error: {status} (Server returned HTML error page)")
        } else {
            // Truncate very long error messages
            let truncated = if error_text.len() > 500 {
                format!("{}... (truncated)", &error_text[..500])
            } else {
                error_text
            };
            format!("API error: {status} - {truncated}")
        };

        return Err(LlmError::ApiError(clean_message));
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::JsonError(e.to_string()))
}

/// Extracts text content from a JSON response by navigating a path.
///
/// Path segments may be object keys or numeric array indices, e.g.
/// `["candidates", "0", "content", "parts", "0", "text"]` for Gemini or
/// `["choices", "0", "message", "content"]` for OpenRouter.
///
/// # Errors
///
/// Returns `LlmError::ApiError` if the path is invalid or the target is
/// not a string.
pub fn extract_text_content(response: &Value, path: &[&str]) -> Result<String, LlmError> {
    let mut current = response;

    for segment in path {
        // Try to parse as index first
        if let Ok(index) = segment.parse::<usize>() {
            current = current.get(index).ok_or_else(|| {
                LlmError::ApiError(format!("Invalid path: missing index {index}"))
            })?;
        } else {
            current = current.get(*segment).ok_or_else(|| {
                LlmError::ApiError(format!("Invalid path: missing key {segment}"))
            })?;
        }
    }

    current
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| LlmError::ApiError(format!("Expected string at path, got: {current:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_text_navigates_mixed_path() {
        let body = json!({"choices": [{"message": {"content": "hi"}}]});
        let text = extract_text_content(&body, &["choices", "0", "message", "content"]);
        assert_eq!(text.ok().as_deref(), Some("hi"));
    }

    #[test]
    fn extract_text_reports_missing_key() {
        let body = json!({"choices": []});
        let err = extract_text_content(&body, &["choices", "0", "message"]);
        assert!(err.is_err());
    }
}
