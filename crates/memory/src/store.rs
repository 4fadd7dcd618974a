//! In-process cache of all produced summaries.

use chrono::Utc;
use parking_lot::RwLock;

use recap_chatlog::ChatLog;
use recap_domain::config::RetrievalConfig;
use recap_domain::trace::TraceEvent;

use crate::retrieval::extract_keywords;
use crate::types::{MemoryEntry, MemoryKind};

/// Cache of message, scene, and custom memories for one chat session.
pub struct MemoryStore {
    entries: RwLock<Vec<MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Rebuild the derived (message/scene) entries from chat-log metadata.
    ///
    /// O(n) in log length; run once per chat-change event. Custom entries
    /// are retained verbatim — they have no backing metadata to rebuild
    /// from.
    pub fn rebuild(&self, log: &ChatLog, cfg: &RetrievalConfig) {
        let mut rebuilt: Vec<MemoryEntry> = Vec::new();
        let mut message_entries = 0;
        let mut scene_entries = 0;

        for (index, msg) in log.iter().enumerate() {
            let created_at = msg.meta.summarized_at.unwrap_or_else(Utc::now);
            if let Some(ref summary) = msg.meta.summary {
                rebuilt.push(MemoryEntry::new(
                    MemoryKind::Message,
                    Some(index),
                    summary,
                    extract_keywords(summary, cfg),
                    created_at,
                ));
                message_entries += 1;
            }
            if msg.meta.scene_end {
                if let Some(ref summary) = msg.meta.scene_summary {
                    rebuilt.push(MemoryEntry::new(
                        MemoryKind::Scene,
                        Some(index),
                        summary,
                        extract_keywords(summary, cfg),
                        created_at,
                    ));
                    scene_entries += 1;
                }
            }
        }

        let mut entries = self.entries.write();
        let custom: Vec<MemoryEntry> = entries
            .iter()
            .filter(|e| e.kind == MemoryKind::Custom)
            .cloned()
            .collect();
        let custom_entries = custom.len();
        rebuilt.extend(custom);
        *entries = rebuilt;

        TraceEvent::MemoryRebuilt {
            message_entries,
            scene_entries,
            custom_entries,
        }
        .emit();
    }

    /// Append a freshly produced summary.
    pub fn record(
        &self,
        kind: MemoryKind,
        source_index: Option<usize>,
        summary: &str,
        cfg: &RetrievalConfig,
    ) {
        let entry = MemoryEntry::new(
            kind,
            source_index,
            summary,
            extract_keywords(summary, cfg),
            Utc::now(),
        );
        self.entries.write().push(entry);
    }

    /// Add an out-of-band custom memory with explicit keywords.
    pub fn record_custom(&self, summary: &str, keywords: Vec<String>) {
        let entry = MemoryEntry::new(MemoryKind::Custom, None, summary, keywords, Utc::now());
        self.entries.write().push(entry);
    }

    /// Snapshot of all entries in insertion order.
    pub fn all(&self) -> Vec<MemoryEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Entries that are derived from the log (everything except custom).
    pub fn derived_count(&self) -> usize {
        self.entries
            .read()
            .iter()
            .filter(|e| e.kind != MemoryKind::Custom)
            .count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
