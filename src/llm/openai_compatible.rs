// ABOUTME: OpenAI-compatible chat completions client
// ABOUTME: Serves the hosted OpenAI API by default and any endpoint speaking the same protocol
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

//! # `OpenAI`-Compatible Provider
//!
//! Non-streaming client for `POST {base_url}/chat/completions`. Configured
//! from [`LlmConfig`](crate::config::LlmConfig); the API key is optional so
//! local servers such as Ollama or vLLM work unchanged.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use crate::config::LlmConfig;
use crate::constants::service_names::LLM_SERVICE;
use socrai_core::errors::{AppError, ErrorCode};

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <https://api.openai.com/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl From<&LlmConfig> for OpenAiCompatibleConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_model: config.model.clone(),
            request_timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Add authorization header if API key is configured
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }

    /// Parse error response from API
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let detail = error_response.error;
            match status.as_u16() {
                401 => AppError::external_service(
                    LLM_SERVICE,
                    format!("API authentication failed: {}", detail.message),
                ),
                429 => AppError::new(
                    ErrorCode::ExternalRateLimited,
                    format!("{LLM_SERVICE}: rate limit reached: {}", detail.message),
                ),
                _ => AppError::external_service(
                    LLM_SERVICE,
                    format!(
                        "{} - {}",
                        detail.error_type.as_deref().unwrap_or("unknown"),
                        detail.message
                    ),
                ),
            }
        } else {
            AppError::external_service(
                LLM_SERVICE,
                format!(
                    "API error ({}): {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
            )
        }
    }

    /// Extract the first choice of a successful response body
    fn parse_success_body(body: &str, requested_model: &str) -> Result<ChatResponse, AppError> {
        let response: OpenAiResponse = serde_json::from_str(body).map_err(|e| {
            error!(
                "Failed to parse API response: {} - body: {}",
                e,
                body.chars().take(500).collect::<String>()
            );
            AppError::external_service(LLM_SERVICE, format!("Failed to parse response: {e}"))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(LLM_SERVICE, "API returned no choices"))?;

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response
                .model
                .unwrap_or_else(|| requested_model.to_owned()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %self.config.default_model))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = self.config.default_model.as_str();

        let openai_request = OpenAiRequest {
            model: model.to_owned(),
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            "Sending chat completion request with {} messages",
            openai_request.messages.len()
        );

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .json(&openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to {}: {}", LLM_SERVICE, e);
                if e.is_timeout() {
                    AppError::new(
                        ErrorCode::ExternalServiceUnavailable,
                        format!("{LLM_SERVICE}: request timed out"),
                    )
                } else {
                    AppError::new(
                        ErrorCode::ExternalServiceUnavailable,
                        format!("{LLM_SERVICE}: failed to connect: {e}"),
                    )
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read API response: {}", e);
            AppError::external_service(LLM_SERVICE, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        Self::parse_success_body(&body, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
            base_url: base_url.to_owned(),
            api_key: None,
            default_model: "gpt-4o-mini".to_owned(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_config_model_is_the_request_model() {
        let config = LlmConfig {
            model: "llama3.1".to_owned(),
            ..LlmConfig::default()
        };
        let provider =
            OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::from(&config)).unwrap();
        assert_eq!(provider.default_model(), "llama3.1");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        assert_eq!(
            provider("https://api.openai.com/v1/").api_url("chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_parse_success_body_takes_first_choice() {
        let body = r#"{
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"message": {"role": "assistant", "content": "What does len() return?"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let response = OpenAiCompatibleProvider::parse_success_body(body, "gpt-4o-mini").unwrap();
        assert_eq!(response.content, "What does len() return?");
        assert_eq!(response.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_parse_success_body_without_choices_is_error() {
        let err = OpenAiCompatibleProvider::parse_success_body(r#"{"choices": []}"#, "m")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }

    #[test]
    fn test_parse_error_response_variants() {
        let quota = r#"{"error": {"message": "You exceeded your current quota", "type": "insufficient_quota"}}"#;
        let err = OpenAiCompatibleProvider::parse_error_response(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            quota,
        );
        assert_eq!(err.code, ErrorCode::ExternalRateLimited);
        assert!(err.message.contains("quota"));

        let err = OpenAiCompatibleProvider::parse_error_response(
            reqwest::StatusCode::BAD_GATEWAY,
            "<html>bad gateway</html>",
        );
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
        assert!(err.message.contains("502"));
    }

    #[test]
    fn test_request_serialization_omits_unset_fields() {
        let request = OpenAiRequest {
            model: "gpt-4o-mini".to_owned(),
            messages: vec![OpenAiMessage::from(&ChatMessage::user("hi"))],
            temperature: None,
            max_tokens: Some(2000),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
