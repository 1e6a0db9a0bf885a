use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::conversation::ConversationHandle;
use super::traits::Model;
use super::types::{ChatMessage, ModelConfig, ModelResponse, TokenUsage};
use crate::constants::{HEALTH_CHECK_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS};
use crate::utils::RelayError;

/// Model client for any OpenAI-compatible chat-completions endpoint.
///
/// The default setup points it at a LiteLLM proxy, which takes care of
/// provider-specific authentication and routing (`gemini/...`, `openai/...`).
pub struct UnifiedModel {
    client: Client,
    proxy_url: String,
    model_name: String,
    master_key: Option<String>,
}

impl UnifiedModel {
    /// Create a new unified model instance
    pub fn new(model_name: &str, proxy_url: &str, master_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
                .build()?,
            proxy_url: proxy_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            master_key,
        })
    }

    /// Build the OpenAI-format request body for one turn
    fn request_body(
        &self,
        conversation: &ConversationHandle,
        input: &str,
        config: &ModelConfig,
    ) -> Value {
        let system = config.system_prompt.as_deref().map(ChatMessage::system);
        let current = ChatMessage::user(input);

        let json_messages: Vec<Value> = system
            .iter()
            .chain(conversation.messages())
            .chain(std::iter::once(&current))
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content
                })
            })
            .collect();

        let mut request_body = json!({
            "model": self.model_name,
            "messages": json_messages,
            "stream": false,
        });

        if let Some(temp) = config.temperature {
            request_body["temperature"] = json!(temp);
        }
        if let Some(max_tokens) = config.max_tokens {
            request_body["max_tokens"] = json!(max_tokens);
        }
        if let Some(top_p) = config.top_p {
            request_body["top_p"] = json!(top_p);
        }

        request_body
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.master_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }
}

#[async_trait]
impl Model for UnifiedModel {
    async fn chat(
        &self,
        conversation: &ConversationHandle,
        input: &str,
        config: &ModelConfig,
    ) -> Result<ModelResponse> {
        let url = format!("{}/v1/chat/completions", self.proxy_url);
        let request_body = self.request_body(conversation, input, config);

        let response = self
            .authorized(self.client.post(&url).json(&request_body))
            .send()
            .await
            .with_context(|| format!("Failed to reach model endpoint at {}", self.proxy_url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read chat completion response")?;
        let (content, usage) = parse_completion(status, &body)?;

        Ok(ModelResponse {
            conversation: conversation.with_exchange(input, &content, config.max_history_messages),
            content,
            usage,
            model_name: self.model_name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    async fn validate_connection(&self) -> Result<bool> {
        let health_client = Client::builder()
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .build()?;

        let health_url = format!("{}/health", self.proxy_url);
        if let Ok(response) = self.authorized(health_client.get(&health_url)).send().await {
            if response.status().is_success() {
                return Ok(true);
            }
        }

        // Plain OpenAI-compatible endpoints have no /health
        let models_url = format!("{}/v1/models", self.proxy_url);
        match self.authorized(health_client.get(&models_url)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

/// Map an HTTP status and body to the reply text and token usage
fn parse_completion(status: StatusCode, body: &str) -> Result<(String, Option<TokenUsage>)> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(RelayError::QuotaExceeded(body.to_string()).into());
    }
    if !status.is_success() {
        return Err(RelayError::ApiError(format!("{}: {}", status, body)).into());
    }

    let response: ChatCompletionResponse =
        serde_json::from_str(body).context("Malformed chat completion response")?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| RelayError::ModelError("Response contained no message".to_string()))?;

    let usage = response.usage.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok((content, usage))
}

// Response structures (OpenAI format)

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> UnifiedModel {
        UnifiedModel::new("gemini/gemini-2.0-flash-exp", "http://localhost:4000/", None).unwrap()
    }

    #[test]
    fn test_request_body_replays_history() {
        let conversation = ConversationHandle::new().with_exchange("hi", "hello!", None);
        let config = ModelConfig {
            system_prompt: Some("be brief".to_string()),
            ..ModelConfig::default()
        };

        let body = model().request_body(&conversation, "how are you?", &config);
        let messages = body["messages"].as_array().unwrap();

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "hi");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["content"], "how are you?");
        assert_eq!(body["model"], "gemini/gemini-2.0-flash-exp");
        assert_eq!(body["max_tokens"], 8192);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        assert_eq!(model().proxy_url, "http://localhost:4000");
    }

    fn relay_error(err: anyhow::Error) -> RelayError {
        err.downcast::<RelayError>().unwrap()
    }

    #[test]
    fn test_completion_reply_and_usage() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hi there"}}],
            "usage":{"prompt_tokens":5,"completion_tokens":2,"total_tokens":7}}"#;

        let (content, usage) = parse_completion(StatusCode::OK, raw).unwrap();

        assert_eq!(content, "hi there");
        assert_eq!(usage.map(|u| u.total_tokens), Some(7));
    }

    #[test]
    fn test_rate_limit_is_quota_exceeded() {
        let err = parse_completion(StatusCode::TOO_MANY_REQUESTS, "slow down").unwrap_err();
        assert!(matches!(relay_error(err), RelayError::QuotaExceeded(body) if body == "slow down"));
    }

    #[test]
    fn test_other_status_is_api_error() {
        let err = parse_completion(StatusCode::INTERNAL_SERVER_ERROR, "boom").unwrap_err();
        match relay_error(err) {
            RelayError::ApiError(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_completion_without_content_is_model_error() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let err = parse_completion(StatusCode::OK, raw).unwrap_err();
        assert!(matches!(relay_error(err), RelayError::ModelError(_)));

        let err = parse_completion(StatusCode::OK, r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(relay_error(err), RelayError::ModelError(_)));
    }

    #[test]
    fn test_malformed_completion_is_an_error() {
        assert!(parse_completion(StatusCode::OK, "not json").is_err());
    }
}
