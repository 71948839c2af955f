use crate::{
    config::ProviderConfig,
    core::result::TokenUsage,
    error::{Result, SproutError},
    services::openai_client::{ChatCompletionRequest, OpenAIClient},
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;

/// Reply from a single chat completion
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Text of the assistant message (empty if the model only called tools)
    pub content: String,
    /// The full assistant message as returned by the API
    pub message: Value,
    pub usage: Option<TokenUsage>,
    /// Model name echoed by the provider, when present
    pub model: Option<String>,
}

/// Chat model bound to one provider, model name and sampling temperature
#[derive(Debug, Clone)]
pub struct ChatModel {
    client: OpenAIClient,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl ChatModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: OpenAIClient::new(api_key),
            model: model.into(),
            temperature: None,
            max_tokens: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Build from a provider config: its base URL, chat model, temperature
    /// and timeout
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.api_key.clone(), config.chat_model.clone())
            .with_base_url(config.base_url.clone())
            .with_temperature(config.temperature)
            .with_timeout(config.timeout)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.set_base_url(base_url);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Send `prompt` as a single user message
    pub async fn invoke(&self, prompt: &str) -> Result<ChatResponse> {
        self.invoke_messages(vec![json!({
            "role": "user",
            "content": prompt
        })])
        .await
    }

    /// Send a full conversation
    pub async fn invoke_messages(&self, messages: Vec<Value>) -> Result<ChatResponse> {
        let response = self.send(self.request(messages)).await?;
        parse_chat_response(&response)
    }

    /// A request prefilled with this model's settings
    pub(crate) fn request(&self, messages: Vec<Value>) -> ChatCompletionRequest {
        ChatCompletionRequest::new(self.model.clone(), messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    pub(crate) async fn send(&self, request: ChatCompletionRequest) -> Result<Value> {
        let body = request.into_value();
        timeout(self.timeout, self.client.chat_completion(&body, self.timeout))
            .await
            .map_err(|_| {
                SproutError::Timeout(format!(
                    "Chat completion did not finish within {}s",
                    self.timeout.as_secs()
                ))
            })?
    }
}

/// Pull the first choice's assistant message out of a completion response
pub(crate) fn parse_chat_response(response: &Value) -> Result<ChatResponse> {
    let message = response
        .get("choices")
        .and_then(|value| value.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .cloned()
        .ok_or_else(|| {
            SproutError::UnexpectedResponse(
                "Completion response has no choices[0].message".to_string(),
            )
        })?;

    let content = message
        .get("content")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string();

    Ok(ChatResponse {
        content,
        message,
        usage: TokenUsage::from_response(response),
        model: response
            .get("model")
            .and_then(|value| value.as_str())
            .map(|s| s.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let response = json!({
            "model": "gemini-2.5-flash",
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        });
        let parsed = parse_chat_response(&response).unwrap();
        assert_eq!(parsed.content, "Hello!");
        assert_eq!(parsed.model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(parsed.usage.unwrap().total_tokens, 5);
    }

    #[test]
    fn test_parse_rejects_missing_choices() {
        let err = parse_chat_response(&json!({"choices": []})).unwrap_err();
        assert_eq!(err.error_code(), "UNEXPECTED_RESPONSE");
    }

    #[test]
    fn test_null_content_becomes_empty() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": null, "tool_calls": []}}]
        });
        assert_eq!(parse_chat_response(&response).unwrap().content, "");
    }

    #[test]
    fn test_request_carries_temperature() {
        let model = ChatModel::new("k", "m").with_temperature(0.0);
        let body = model.request(Vec::new()).into_value();
        assert_eq!(body["model"], "m");
        assert_eq!(body["temperature"], 0.0);
    }
}
