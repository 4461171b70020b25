//! Anthropic Messages API client

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::clients::http::{build_client, ensure_success, map_send_err};
use crate::clients::traits::{Advisor, AdvisorError, AdvisorReply, AdvisorRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_ms: u64,
}

impl AnthropicClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, AdvisorError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AdvisorError::MissingApiKey("anthropic".to_string()));
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

    fn build_body(&self, request: &AdvisorRequest) -> Value {
        build_messages_body(&self.model, self.max_tokens, self.temperature, request)
    }
}

pub(crate) fn build_messages_body(
    model: &str,
    max_tokens: u32,
    temperature: f32,
    request: &AdvisorRequest,
) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
        .collect();
    let mut body = json!({
        "model": model,
        "max_tokens": max_tokens,
        "temperature": temperature,
        "messages": messages,
    });
    if !request.system.is_empty() {
        body["system"] = Value::String(request.system.clone());
    }
    body
}

/// Concatenate every text block of a Messages API response.
pub(crate) fn parse_messages_response(val: &Value) -> Result<String, AdvisorError> {
    if let Some(err) = val.get("error") {
        let msg = err
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        return Err(AdvisorError::Http(msg.to_string()));
    }
    let text: String = val
        .get("content")
        .and_then(|c| c.as_array())
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AdvisorError::ParseError(
            "response contained no text content".to_string(),
        ));
    }
    Ok(text.trim().to_string())
}

#[async_trait]
impl Advisor for AnthropicClient {
    fn provider(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &AdvisorRequest) -> Result<AdvisorReply, AdvisorError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        tracing::debug!(model = %self.model, turns = request.messages.len(), "anthropic request");

        let resp = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| map_send_err(e, self.timeout_ms))?;

        let val: Value = ensure_success(resp, "Anthropic")
            .await?
            .json()
            .await
            .map_err(|e| AdvisorError::ParseError(e.to_string()))?;
        let text = parse_messages_response(&val)?;
        let model = val
            .get("model")
            .and_then(|m| m.as_str())
            .unwrap_or(&self.model)
            .to_string();

        Ok(AdvisorReply {
            text,
            provider: self.provider().to_string(),
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::http::test_server::serve;
    use crate::clients::traits::ChatMessage;

    #[test]
    fn body_carries_system_and_turns() {
        let req = AdvisorRequest {
            system: "context".into(),
            messages: vec![
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
                ChatMessage::user("why?"),
            ],
        };
        let body = build_messages_body("m", 256, 0.2, &req);
        assert_eq!(body["system"], "context");
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn parses_text_blocks() {
        let val = json!({
            "model": "m",
            "content": [
                {"type": "text", "text": "Proceed "},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "in phases."}
            ]
        });
        assert_eq!(parse_messages_response(&val).unwrap(), "Proceed in phases.");
    }

    #[test]
    fn empty_or_error_payloads_fail() {
        assert!(parse_messages_response(&json!({"content": []})).is_err());
        let err =
            parse_messages_response(&json!({"error": {"message": "overloaded"}})).unwrap_err();
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn rejects_blank_key() {
        assert!(matches!(
            AnthropicClient::new("  ", "m", 1000),
            Err(AdvisorError::MissingApiKey(_))
        ));
    }

    #[tokio::test]
    async fn complete_maps_live_responses() {
        let ok = json!({
            "model": "claude-test",
            "content": [{"type": "text", "text": "Go in phases."}]
        })
        .to_string();
        let base = serve(vec![
            (200, ok),
            (429, r#"{"error":{"message":"slow down"}}"#.to_string()),
            (500, "upstream boom".to_string()),
        ])
        .await;
        let client = AnthropicClient::new("k", "m", 5_000)
            .unwrap()
            .with_base_url(base);
        let req = AdvisorRequest {
            system: "ctx".into(),
            messages: vec![ChatMessage::user("go?")],
        };

        let reply = client.complete(&req).await.unwrap();
        assert_eq!(reply.text, "Go in phases.");
        assert_eq!(reply.provider, "anthropic");
        assert_eq!(reply.model, "claude-test");

        let err = client.complete(&req).await.unwrap_err();
        assert!(matches!(err, AdvisorError::RateLimited(_)), "{err:?}");

        match client.complete(&req).await {
            Err(AdvisorError::Http(msg)) => assert!(msg.contains("Anthropic: HTTP 500"), "{msg}"),
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }
}
