//! JSONL-persisted chat log.
//!
//! One message per line. Unlike an append-only transcript, summary metadata
//! mutates in place, so `save` rewrites the whole file.

use std::path::{Path, PathBuf};

use recap_domain::error::{Error, Result};
use recap_domain::trace::TraceEvent;

use crate::message::ChatMessage;

/// An ordered, index-addressed sequence of chat messages.
pub struct ChatLog {
    path: Option<PathBuf>,
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// An unpersisted, empty log (tests, scratch sessions).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            messages: Vec::new(),
        }
    }

    /// Build a log from existing messages without a backing file.
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            path: None,
            messages,
        }
    }

    /// Load a log from a JSONL file. A missing file yields an empty log
    /// bound to that path; malformed lines are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let mut messages = Vec::new();
        if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
            for (lineno, line) in raw.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<ChatMessage>(line) {
                    Ok(msg) => messages.push(msg),
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            line = lineno + 1,
                            error = %e,
                            "skipping malformed chat line"
                        );
                    }
                }
            }
        }
        Ok(Self {
            path: Some(path.to_path_buf()),
            messages,
        })
    }

    /// Persist the full log back to its file. No-op for in-memory logs.
    pub fn save(&self) -> Result<()> {
        let path = match &self.path {
            Some(p) => p,
            None => return Ok(()),
        };

        let mut buf = String::new();
        for msg in &self.messages {
            buf.push_str(&serde_json::to_string(msg)?);
            buf.push('\n');
        }
        std::fs::write(path, buf).map_err(Error::Io)?;

        TraceEvent::ChatPersisted {
            path: path.display().to_string(),
            messages: self.messages.len(),
        }
        .emit();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ChatMessage> {
        self.messages.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChatMessage> {
        self.messages.iter_mut()
    }

    /// Append a message (host-side structure change).
    pub fn push(&mut self, msg: ChatMessage) {
        self.messages.push(msg);
    }

    /// Remove messages in `start..=end` from the AI-visible context without
    /// deleting them. Returns how many messages changed visibility.
    pub fn hide_range(&mut self, start: usize, end: usize) -> Result<usize> {
        Error::check_range(start, end, self.messages.len())?;

        let mut changed = 0;
        for msg in &mut self.messages[start..=end] {
            if !msg.is_system {
                msg.is_system = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Body of the most recent visible user message, if any. Used as the
    /// fallback retrieval query.
    pub fn last_user_body(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_user && m.is_visible())
            .map(|m| m.body.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ChatMessage;

    fn sample_log() -> ChatLog {
        ChatLog::from_messages(vec![
            ChatMessage::user("Alice", "hello"),
            ChatMessage::character("Bot", "hi Alice"),
            ChatMessage::user("Alice", "tell me a story"),
        ])
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");

        let mut log = sample_log();
        log.path = Some(path.clone());
        log.get_mut(0).unwrap().meta.summary = Some("greeting".into());
        log.save().unwrap();

        let reloaded = ChatLog::load(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(
            reloaded.get(0).unwrap().meta.summary.as_deref(),
            Some("greeting")
        );
    }

    #[test]
    fn load_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");
        std::fs::write(
            &path,
            "{\"name\":\"A\",\"body\":\"ok\"}\nnot json\n{\"name\":\"B\",\"body\":\"fine\"}\n",
        )
        .unwrap();

        let log = ChatLog::load(&path).unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = ChatLog::load(&dir.path().join("nope.jsonl")).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn hide_range_marks_and_counts() {
        let mut log = sample_log();
        let changed = log.hide_range(0, 1).unwrap();
        assert_eq!(changed, 2);
        assert!(!log.get(0).unwrap().is_visible());
        assert!(log.get(2).unwrap().is_visible());

        // idempotent
        assert_eq!(log.hide_range(0, 1).unwrap(), 0);
    }

    #[test]
    fn hide_range_out_of_bounds() {
        let mut log = sample_log();
        assert!(log.hide_range(0, 5).is_err());
        assert!(log.hide_range(2, 1).is_err());
    }

    #[test]
    fn last_user_body_skips_hidden() {
        let mut log = sample_log();
        log.hide_range(2, 2).unwrap();
        assert_eq!(log.last_user_body(), Some("hello"));
    }
}
