use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Summarization policy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Placeholder in the prompt templates replaced with the message/scene text.
/// Everything outside the placeholder becomes the system instruction.
pub const CONTENT_PLACEHOLDER: &str = "{{content}}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizationConfig {
    /// Prompt template for single-message summaries. Must contain
    /// [`CONTENT_PLACEHOLDER`].
    #[serde(default = "d_message_prompt")]
    pub message_prompt: String,
    /// Prompt template for scene/chapter summaries. Must contain
    /// [`CONTENT_PLACEHOLDER`].
    #[serde(default = "d_scene_prompt")]
    pub scene_prompt: String,
    /// When true, a message with a summary counts as its summary for
    /// token accounting (and context injection) instead of its body.
    #[serde(default)]
    pub replace_with_summary: bool,
    /// Run the auto-hide batch after each produced message summary.
    #[serde(default)]
    pub auto_hide: bool,
    /// How many recent summarized messages the auto-hide batch leaves
    /// visible.
    #[serde(default = "d_10")]
    pub keep_recent_count: usize,
    /// Hide all messages before the end of a summarized scene.
    #[serde(default)]
    pub hide_summarized_scenes: bool,
    /// Summarize each newly rendered message automatically.
    #[serde(default)]
    pub auto_summarize: bool,
    /// Auto-fill chapter interval in messages. `0` disables interval
    /// triggering; explicit `autofill` commands still work.
    #[serde(default)]
    pub auto_fill_interval: usize,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            message_prompt: d_message_prompt(),
            scene_prompt: d_scene_prompt(),
            replace_with_summary: false,
            auto_hide: false,
            keep_recent_count: 10,
            hide_summarized_scenes: false,
            auto_summarize: false,
            auto_fill_interval: 0,
        }
    }
}

impl SummarizationConfig {
    /// Derive the system instruction from a template by removing the
    /// content placeholder and tidying whitespace.
    pub fn system_instruction(template: &str) -> String {
        template.replace(CONTENT_PLACEHOLDER, "").trim().to_string()
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_message_prompt() -> String {
    "Summarize the following chat message in one or two sentences. \
     Keep names, places, and stated facts exact. Write in past tense. \
     Do not add commentary.\n\n{{content}}"
        .into()
}

fn d_scene_prompt() -> String {
    "Summarize the following scene from a chat conversation. Capture what \
     happened, decisions made, and details that matter for continuing the \
     story. Keep names and facts exact. Be concise.\n\n{{content}}"
        .into()
}

fn d_10() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_strips_placeholder() {
        let sys = SummarizationConfig::system_instruction("Do the thing.\n\n{{content}}");
        assert_eq!(sys, "Do the thing.");
    }

    #[test]
    fn default_prompts_carry_placeholder() {
        let cfg = SummarizationConfig::default();
        assert!(cfg.message_prompt.contains(CONTENT_PLACEHOLDER));
        assert!(cfg.scene_prompt.contains(CONTENT_PLACEHOLDER));
    }
}
