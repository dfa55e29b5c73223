//! Non-streaming client for `POST {base}/v1/chat/completions`.

use serde::Serialize;
use serde_json::Value;
use shared::agent_api::ChatMessage;
use std::time::Duration;

use crate::error::ChatError;
use crate::message_builder::message_to_wire;
use crate::SHARED_HTTP;

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    temperature: f32,
    max_tokens: u32,
}

/// Sampling and transport knobs for one request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4096,
            timeout: Duration::from_secs(3600),
        }
    }
}

// ── Reply extraction ─────────────────────────────────────────────────

/// `choices[0].message.content`, if the reply has that shape.
pub fn extract_reply(body: &Value) -> Result<String, ChatError> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| ChatError::MalformedResponse("missing choices[0].message.content".into()))
}

/// Reply text, or the whole response pretty-printed when the expected
/// field is absent.
pub fn reply_or_raw(raw: &str) -> String {
    let body: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("completion reply is not JSON: {}", e);
            return raw.to_string();
        }
    };
    match extract_reply(&body) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("{}; returning raw response", e);
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| raw.to_string())
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

pub struct CompletionClient {
    base_url: String,
    api_key: Option<String>,
}

impl CompletionClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub async fn complete(
        &self,
        message: &ChatMessage,
        model: &str,
        params: CompletionParams,
    ) -> Result<String, ChatError> {
        let url = self.endpoint();
        let req = CompletionRequest {
            model,
            messages: vec![message_to_wire(message)],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };
        tracing::debug!(%url, model, parts = message.content.len(), "sending completion request");

        let mut builder = SHARED_HTTP
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(params.timeout)
            .json(&req);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let resp = builder.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let detail: String = body.chars().take(800).collect();
            return Err(ChatError::Http {
                status,
                body: detail,
            });
        }

        let raw = resp.text().await?;
        Ok(reply_or_raw(&raw))
    }
}
