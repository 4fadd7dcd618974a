use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single message record in the chat log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name of the author.
    pub name: String,
    /// Body text.
    pub body: String,
    /// Authored by the human user (as opposed to a character/assistant).
    #[serde(default)]
    pub is_user: bool,
    /// Hidden from the AI-visible context. Covers both genuine system
    /// messages and messages hidden after summarization.
    #[serde(default)]
    pub is_system: bool,
    /// Summary metadata written by the engine. The log never touches this
    /// beyond (de)serialization.
    #[serde(default, skip_serializing_if = "SummaryMeta::is_empty")]
    pub meta: SummaryMeta,
}

/// Typed summary metadata attached to each message record.
///
/// Replaces the loosely-typed side-channel fields of ad hoc metadata bags:
/// every field is explicit and optional, and validated by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryMeta {
    /// Single-message summary, when produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// When the most recent summary (message or scene) was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarized_at: Option<DateTime<Utc>>,
    /// This message is the last of a summarized scene.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub scene_end: bool,
    /// Summary of the scene ending at this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_summary: Option<String>,
    /// Index of the first message of that scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_start: Option<usize>,
    /// Hidden by the auto-hide batch (as opposed to hidden by the user),
    /// so clearing summaries can restore exactly what the system hid.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_hidden: bool,
}

impl ChatMessage {
    pub fn user(name: &str, body: &str) -> Self {
        Self {
            name: name.to_owned(),
            body: body.to_owned(),
            is_user: true,
            is_system: false,
            meta: SummaryMeta::default(),
        }
    }

    pub fn character(name: &str, body: &str) -> Self {
        Self {
            name: name.to_owned(),
            body: body.to_owned(),
            is_user: false,
            is_system: false,
            meta: SummaryMeta::default(),
        }
    }

    /// Part of the AI-visible context.
    pub fn is_visible(&self) -> bool {
        !self.is_system
    }

    /// `"{name}: {body}"`, the shape summarization prompts are built from.
    pub fn as_prompt_line(&self) -> String {
        format!("{}: {}", self.name, self.body)
    }
}

impl SummaryMeta {
    pub fn is_empty(&self) -> bool {
        *self == SummaryMeta::default()
    }

    /// Whether any summary field (message or scene) is populated.
    pub fn has_any_summary(&self) -> bool {
        self.summary.is_some()
            || self.scene_end
            || self.scene_summary.is_some()
            || self.scene_start.is_some()
            || self.summarized_at.is_some()
    }

    /// Strip all summary fields, leaving `auto_hidden` to the caller.
    /// Returns true if anything was removed.
    pub fn clear_summaries(&mut self) -> bool {
        let had = self.has_any_summary();
        self.summary = None;
        self.summarized_at = None;
        self.scene_end = false;
        self.scene_summary = None;
        self.scene_start = None;
        had
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_line_shape() {
        let msg = ChatMessage::user("Alice", "hello there");
        assert_eq!(msg.as_prompt_line(), "Alice: hello there");
    }

    #[test]
    fn empty_meta_not_serialized() {
        let msg = ChatMessage::character("Bot", "hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("meta"));
    }

    #[test]
    fn clear_summaries_reports_removal() {
        let mut meta = SummaryMeta {
            summary: Some("s".into()),
            ..Default::default()
        };
        assert!(meta.clear_summaries());
        assert!(!meta.clear_summaries());
    }

    #[test]
    fn clear_summaries_keeps_auto_hidden() {
        let mut meta = SummaryMeta {
            scene_end: true,
            auto_hidden: true,
            ..Default::default()
        };
        meta.clear_summaries();
        assert!(meta.auto_hidden);
        assert!(!meta.scene_end);
    }
}
