use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, SproutError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const CHAT_ENDPOINT: &str = "chat/completions";
const EMBEDDINGS_ENDPOINT: &str = "embeddings";

/// Minimal client for OpenAI-compatible HTTP APIs. Failures are mapped to
/// [`SproutError`] and returned as-is; nothing is retried.
#[derive(Clone)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub async fn chat_completion(&self, body: &Value, timeout: Duration) -> Result<Value> {
        self.post_json(CHAT_ENDPOINT, body, timeout).await
    }

    pub async fn embeddings(&self, body: &Value, timeout: Duration) -> Result<Value> {
        self.post_json(EMBEDDINGS_ENDPOINT, body, timeout).await
    }

    async fn post_json(&self, endpoint: &str, body: &Value, timeout: Duration) -> Result<Value> {
        let request_url = build_url(&self.base_url, endpoint);
        debug!(url = %request_url, "POST");

        let response = self
            .http
            .post(&request_url)
            .timeout(timeout)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("X-Title", "sprout-smoke")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        let response_text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SproutError::RateLimit {
                retry_after: retry_after.unwrap_or(1).max(1),
            });
        }

        let response_json: Option<Value> = serde_json::from_str(&response_text).ok();

        if !status.is_success() {
            let api_message = response_json
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| response_text.clone());
            return Err(SproutError::Api {
                status: status.as_u16(),
                message: api_message,
            });
        }

        let response_json = response_json.ok_or_else(|| {
            SproutError::UnexpectedResponse(format!(
                "Response from {} is not JSON: {}",
                endpoint,
                truncate(&response_text, 200)
            ))
        })?;

        // Some compatible gateways report failures inside a 200 response.
        if response_json.get("error").is_some_and(|error| !error.is_null()) {
            return Err(SproutError::Api {
                status: status.as_u16(),
                message: error_message(&response_json)
                    .unwrap_or_else(|| response_json["error"].to_string()),
            });
        }

        Ok(response_json)
    }
}

fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    match error {
        Value::String(message) => Some(message.clone()),
        _ => error
            .get("message")
            .and_then(|value| value.as_str())
            .map(|s| s.to_string()),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub(crate) fn build_url(base_url: &str, endpoint: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with(endpoint) {
        trimmed.to_string()
    } else {
        format!("{}/{}", trimmed, endpoint)
    }
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    tools: Vec<Value>,
    tool_choice: Option<Value>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    stop: Vec<String>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            temperature: None,
            max_tokens: None,
            stop: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools);
        }

        if let Some(tool_choice) = self.tool_choice {
            body["tool_choice"] = tool_choice;
        }

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if !self.stop.is_empty() {
            body["stop"] = json!(self.stop);
        }

        body
    }
}
