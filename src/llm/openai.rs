use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{CompletionRequest, LlmClient};
use crate::error::{NpcError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-1106";

/// Chat-completions client that answers through function calling.
///
/// Each request exposes its schema as the only tool and, when the request
/// forces it, names that tool in `tool_choice`. The tool call's arguments are
/// the structured result.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, model, DEFAULT_BASE_URL, Duration::from_secs(120))
    }

    pub fn with_options(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// The HTTP client's own deadline surfaces as `Timeout`, like the one
    /// enforced by `RetryingClient`
    fn transport_error(&self, err: reqwest::Error) -> NpcError {
        if err.is_timeout() {
            NpcError::Timeout(self.timeout)
        } else {
            err.into()
        }
    }

    /// Builds the chat-completions body for a request
    pub fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "tools": [{
                "type": "function",
                "function": request.schema,
            }],
        });

        body["tool_choice"] = if request.force_schema {
            json!({ "type": "function", "function": { "name": request.schema.name } })
        } else {
            json!("auto")
        };

        body
    }

    /// Pulls the function arguments out of a chat-completions response
    fn extract_arguments(response: &Value) -> Result<Value> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| NpcError::MalformedResponse("no message in response".into()))?;

        if let Some(usage) = response.get("usage") {
            log::debug!(
                "Token usage: prompt={}, completion={}",
                usage.get("prompt_tokens").and_then(Value::as_i64).unwrap_or(0),
                usage.get("completion_tokens").and_then(Value::as_i64).unwrap_or(0),
            );
        }

        let arguments = message
            .get("tool_calls")
            .and_then(|calls| calls.get(0))
            .and_then(|call| call.get("function"))
            .or_else(|| message.get("function_call"))
            .and_then(|function| function.get("arguments"))
            .and_then(Value::as_str)
            .ok_or_else(|| NpcError::MalformedResponse("response has no function call".into()))?;

        serde_json::from_str(arguments).map_err(|e| {
            NpcError::MalformedResponse(format!("function arguments are not JSON: {}", e))
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<Value> {
        let endpoint = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(request);
        log::debug!(
            "Calling {} with schema {} ({} messages)",
            self.model,
            request.schema.name,
            request.messages.len()
        );

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(NpcError::Api {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| {
            NpcError::MalformedResponse(format!("response is not JSON: {}", e))
        })?;

        Self::extract_arguments(&json)
    }
}
