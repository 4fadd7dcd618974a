use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generation backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the summarization endpoint (any OpenAI-compatible
/// chat completions API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the endpoint, e.g. `https://api.openai.com/v1`.
    /// `None` means no endpoint is configured; every generate call fails
    /// with a generation error until one is set.
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key, read verbatim from config. Prefer `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Name of an environment variable holding the API key.
    #[serde(default = "d_key_env")]
    pub api_key_env: Option<String>,
    /// Model identifier sent with each request.
    #[serde(default = "d_model")]
    pub model: String,
    /// Per-call ceiling on response tokens.
    #[serde(default = "d_500")]
    pub max_response_tokens: u32,
    /// Context window of the summarization model, in tokens. Content larger
    /// than `context_limit_tokens - 500` goes through the chunking engine.
    #[serde(default = "d_8192")]
    pub context_limit_tokens: usize,
    /// Soft rate limit: calls per minute. The gateway spaces calls at least
    /// `max(500ms, 60s / rate_per_minute)` apart.
    #[serde(default = "d_60")]
    pub rate_per_minute: u32,
    /// HTTP timeout per call.
    #[serde(default = "d_60000")]
    pub timeout_ms: u64,
    /// Sampling temperature. Low by default: summaries should be factual.
    #[serde(default = "d_temp")]
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            api_key_env: d_key_env(),
            model: d_model(),
            max_response_tokens: 500,
            context_limit_tokens: 8192,
            rate_per_minute: 60,
            timeout_ms: 60_000,
            temperature: d_temp(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_key_env() -> Option<String> {
    Some("RECAP_API_KEY".into())
}
fn d_model() -> String {
    "gpt-4o-mini".into()
}
fn d_500() -> u32 {
    500
}
fn d_8192() -> usize {
    8192
}
fn d_60() -> u32 {
    60
}
fn d_60000() -> u64 {
    60_000
}
fn d_temp() -> f32 {
    0.1
}
