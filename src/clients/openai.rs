//! OpenAI-compatible chat completions client (OpenAI, Grok, local gateways)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::clients::http::{build_client, ensure_success, map_send_err};
use crate::clients::traits::{Advisor, AdvisorError, AdvisorReply, AdvisorRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_ms: u64,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, AdvisorError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AdvisorError::MissingApiKey("openai".to_string()));
        }
        Ok(Self {
            http: build_client(timeout_ms)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: model.into(),
            max_tokens: 1024,
            temperature: 0.3,
            timeout_ms,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

pub(crate) fn build_chat_body(
    model: &str,
    max_tokens: u32,
    temperature: f32,
    request: &AdvisorRequest,
) -> Value {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if !request.system.is_empty() {
        messages.push(json!({ "role": "system", "content": request.system }));
    }
    messages.extend(
        request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content })),
    );
    json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
        "max_tokens": max_tokens
    })
}

pub(crate) fn parse_chat_response(val: &Value) -> Result<String, AdvisorError> {
    if let Some(content) = val
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        && !content.trim().is_empty()
    {
        return Ok(content.trim().to_string());
    }
    Err(AdvisorError::ParseError(format!(
        "unexpected chat completion payload: {}",
        crate::clients::http::truncate_snippet(&val.to_string(), 200)
    )))
}

#[async_trait]
impl Advisor for OpenAiClient {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &AdvisorRequest) -> Result<AdvisorReply, AdvisorError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = build_chat_body(&self.model, self.max_tokens, self.temperature, request);

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_err(e, self.timeout_ms))?;

        let val: Value = ensure_success(resp, "Chat completion")
            .await?
            .json()
            .await
            .map_err(|e| AdvisorError::ParseError(e.to_string()))?;
        Ok(AdvisorReply {
            text: parse_chat_response(&val)?,
            provider: self.provider().to_string(),
            model: self.model.clone(),
        })
    }
}
