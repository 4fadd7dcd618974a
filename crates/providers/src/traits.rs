use recap_domain::error::Result;
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message sent to the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: &str) -> Self {
        Self {
            role: Role::System,
            content: content.to_owned(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_owned(),
        }
    }
}

/// A backend-agnostic completion request.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// The role-tagged messages to send.
    pub messages: Vec<ChatTurn>,
    /// Per-call ceiling on response tokens. `None` lets the backend choose.
    pub max_tokens: Option<u32>,
    /// Sampling temperature. `None` lets the backend choose.
    pub temperature: Option<f32>,
    /// Model override. When `None`, the backend uses its configured default.
    pub model: Option<String>,
}

/// A backend-agnostic completion response.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// Textual content of the response, as returned by the backend.
    pub content: String,
    /// The model that actually produced the response.
    pub model: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core generator trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trait every text-generation adapter must implement.
///
/// Production code uses [`crate::OpenAiCompatClient`]; tests use scripted
/// mocks. Summarization only needs one-shot, non-streaming completions.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Send a completion request and wait for the full response.
    async fn complete(&self, req: &GenerateRequest) -> Result<GenerateResponse>;

    /// A unique identifier for this backend instance.
    fn backend_id(&self) -> &str;
}
