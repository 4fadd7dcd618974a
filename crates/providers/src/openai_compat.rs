//! OpenAI-compatible adapter.
//!
//! Works with OpenAI, Ollama, vLLM, LM Studio, Together, and any other
//! endpoint that follows the OpenAI chat completions contract. Only the
//! non-streaming surface is used; summarization is strictly one-shot.

use recap_domain::config::GenerationConfig;
use recap_domain::error::{Error, Result};
use serde_json::Value;

use crate::traits::{ChatTurn, GenerateRequest, GenerateResponse, Generator, Role};
use crate::util::from_reqwest;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A generation adapter for any OpenAI-compatible API endpoint.
#[derive(Debug)]
pub struct OpenAiCompatClient {
    base_url: String,
    api_key: Option<String>,
    default_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create the adapter from the generation config.
    ///
    /// Fails with [`Error::Generation`] when no endpoint is configured —
    /// the caller gets the same error shape as a failed call, so "not set
    /// up yet" and "broken" look identical at the command boundary.
    pub fn from_config(cfg: &GenerationConfig) -> Result<Self> {
        let base_url = cfg
            .base_url
            .as_deref()
            .ok_or_else(|| {
                Error::Generation("no summarization endpoint configured".into())
            })?
            .trim_end_matches('/')
            .to_string();

        let api_key = resolve_api_key(cfg);
        if api_key.is_none() {
            tracing::debug!("no API key resolved; sending unauthenticated requests");
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url,
            api_key,
            default_model: cfg.model.clone(),
            client,
        })
    }

    fn build_body(&self, req: &GenerateRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(turn_to_openai).collect();
        let model = req
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });
        if let Some(temp) = req.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = req.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn turn_to_openai(turn: &ChatTurn) -> Value {
    serde_json::json!({
        "role": role_to_str(turn.role),
        "content": turn.content,
    })
}

fn resolve_api_key(cfg: &GenerationConfig) -> Option<String> {
    if let Some(ref key) = cfg.api_key {
        tracing::warn!(
            "API key loaded from plaintext config field 'api_key' — \
             prefer 'api_key_env' instead"
        );
        return Some(key.clone());
    }
    cfg.api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
}

fn parse_response(body: &Value) -> Result<GenerateResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Generation("no choices in response".into()))?;

    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(GenerateResponse { content, model })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl Generator for OpenAiCompatClient {
    async fn complete(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(req);

        tracing::debug!(url = %url, "openai_compat completion request");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let resp = request.json(&body).send().await.map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Generation(format!(
                "HTTP {} - {}",
                status.as_u16(),
                resp_text
            )));
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_response(&resp_json)
    }

    fn backend_id(&self) -> &str {
        "openai_compat"
    }
}
