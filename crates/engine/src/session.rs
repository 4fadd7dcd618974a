//! The session-scoped summarization orchestrator.
//!
//! One [`Session`] owns everything for one chat: the log, the chapter
//! timeline, the memory cache, the trigger router, and a handle to the
//! generation gateway. There is no process-global state; two sessions never
//! share summarization state.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use recap_chatlog::ChatLog;
use recap_domain::config::{Config, SummarizationConfig};
use recap_domain::error::{Error, Result};
use recap_domain::trace::TraceEvent;
use recap_memory::{DocumentStore, MemoryKind, MemoryStore, ScoredMemory};
use recap_providers::{GenerationGateway, TokenCounter};

use crate::accounting::ContextFigures;
use crate::chunker;
use crate::events::{TriggerAction, TriggerEvent, TriggerRouter};
use crate::timeline::{Chapter, Timeline};

/// Tokens reserved out of the model context for the response.
const RESPONSE_HEADROOM: usize = 500;

/// Smallest sensible auto-fill block.
const MIN_FILL_INTERVAL: usize = 5;

pub struct Session {
    log: ChatLog,
    timeline: Timeline,
    memory: MemoryStore,
    router: TriggerRouter,
    gateway: Arc<GenerationGateway>,
    counter: Arc<dyn TokenCounter>,
    config: Config,
}

/// Snapshot for the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub messages: usize,
    pub visible: usize,
    pub summarized_messages: usize,
    pub chapters: usize,
    pub memory_entries: usize,
    /// Highest message index covered by a completed scene.
    pub watermark: Option<usize>,
    pub context: ContextFigures,
}

#[derive(Debug, Serialize)]
struct ExportedMemory {
    content: String,
    keywords: Vec<String>,
    metadata: ExportedMeta,
}

#[derive(Debug, Serialize)]
struct ExportedMeta {
    kind: MemoryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_index: Option<usize>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Build a session over a loaded log, rebuilding timeline and memory
    /// caches from its metadata.
    pub fn new(
        log: ChatLog,
        gateway: Arc<GenerationGateway>,
        counter: Arc<dyn TokenCounter>,
        config: Config,
    ) -> Self {
        let timeline = Timeline::rebuild_from_log(&log);
        let memory = MemoryStore::new();
        memory.rebuild(&log, &config.retrieval);
        Self {
            log,
            timeline,
            memory,
            router: TriggerRouter::new(),
            gateway,
            counter,
            config,
        }
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Message summaries
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Summarize the message at `index` and persist the result.
    ///
    /// An empty generator response is not an error: nothing is written and
    /// an empty string comes back, so callers can retry later.
    pub async fn summarize_message(&mut self, index: usize) -> Result<String> {
        Error::check_index(index, self.log.len())?;
        let content = self
            .log
            .get(index)
            .map(|m| m.as_prompt_line())
            .unwrap_or_default();

        let system =
            SummarizationConfig::system_instruction(&self.config.summarization.message_prompt);
        let summary = self.gateway.generate(&content, &system).await?;
        if summary.is_empty() {
            tracing::warn!(index, "generator returned an empty message summary");
            return Ok(String::new());
        }

        if let Some(msg) = self.log.get_mut(index) {
            msg.meta.summary = Some(summary.clone());
            msg.meta.summarized_at = Some(Utc::now());
        }
        self.memory.record(
            MemoryKind::Message,
            Some(index),
            &summary,
            &self.config.retrieval,
        );
        if self.config.summarization.auto_hide {
            self.apply_auto_hide();
        }
        self.log.save()?;

        TraceEvent::MessageSummarized {
            index,
            summary_chars: summary.len(),
        }
        .emit();
        Ok(summary)
    }

    /// Summarize every visible message that has no summary yet. Per-message
    /// failures are logged and skipped; the count of produced summaries
    /// comes back.
    pub async fn summarize_all(&mut self) -> Result<usize> {
        let pending: Vec<usize> = self
            .log
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_visible() && m.meta.summary.is_none())
            .map(|(i, _)| i)
            .collect();

        let mut produced = 0;
        for index in pending {
            match self.summarize_message(index).await {
                Ok(summary) if !summary.is_empty() => produced += 1,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping message in bulk summarize");
                }
            }
        }
        Ok(produced)
    }

    /// Hide the oldest summarized messages, keeping the configured recent
    /// count visible. Idempotent; returns how many newly changed.
    pub fn apply_auto_hide(&mut self) -> usize {
        let keep = self.config.summarization.keep_recent_count;
        let summarized: Vec<usize> = self
            .log
            .iter()
            .enumerate()
            .filter(|(_, m)| m.meta.summary.is_some())
            .map(|(i, _)| i)
            .collect();
        if summarized.len() <= keep {
            return 0;
        }

        let to_hide = summarized.len() - keep;
        let mut hidden = 0;
        for &index in &summarized[..to_hide] {
            if let Some(msg) = self.log.get_mut(index) {
                if !msg.is_system {
                    msg.is_system = true;
                    msg.meta.auto_hidden = true;
                    hidden += 1;
                }
            }
        }

        TraceEvent::AutoHide { hidden, kept: keep }.emit();
        hidden
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Scenes and the timeline
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Summarize messages `start..=end` as one scene, marking the end
    /// message as a scene boundary and appending a chapter.
    ///
    /// Content larger than the model context (minus response headroom) goes
    /// through the chunking engine. Overlap with an existing chapter is
    /// rejected before any generation happens.
    pub async fn summarize_scene(&mut self, start: usize, end: usize) -> Result<String> {
        Error::check_range(start, end, self.log.len())?;
        if let Some(last) = self.timeline.chapters().last() {
            if start <= last.end {
                return Err(Error::InvalidParam(format!(
                    "scene {start}..={end} overlaps chapter ending at {}",
                    last.end
                )));
            }
        }

        let units: Vec<String> = (start..=end)
            .filter_map(|i| self.log.get(i))
            .filter(|m| m.is_visible())
            .map(|m| m.as_prompt_line())
            .collect();
        if units.is_empty() {
            return Err(Error::EmptyRange { start, end });
        }

        let system =
            SummarizationConfig::system_instruction(&self.config.summarization.scene_prompt);
        let budget = self
            .config
            .generation
            .context_limit_tokens
            .saturating_sub(RESPONSE_HEADROOM);
        let joined = units.join("\n\n");
        let chunked = self.counter.count(&joined) > budget;

        let summary = if chunked {
            let gateway = Arc::clone(&self.gateway);
            let sys = system.clone();
            chunker::summarize_large(&units, budget, self.counter.as_ref(), move |content| {
                let gateway = Arc::clone(&gateway);
                let sys = sys.clone();
                async move { gateway.generate(&content, &sys).await }
            })
            .await?
        } else {
            self.gateway.generate(&joined, &system).await?
        };
        if summary.is_empty() {
            return Err(Error::Generation("empty scene summary from backend".into()));
        }

        if let Some(msg) = self.log.get_mut(end) {
            msg.meta.scene_end = true;
            msg.meta.scene_summary = Some(summary.clone());
            msg.meta.scene_start = Some(start);
            msg.meta.summarized_at = Some(Utc::now());
        }
        self.timeline.push(Chapter {
            summary: summary.clone(),
            start,
            end,
        })?;

        if self.config.summarization.hide_summarized_scenes && end > start {
            for i in start..end {
                if let Some(msg) = self.log.get_mut(i) {
                    if !msg.is_system {
                        msg.is_system = true;
                        msg.meta.auto_hidden = true;
                    }
                }
            }
        }

        self.memory.record(
            MemoryKind::Scene,
            Some(end),
            &summary,
            &self.config.retrieval,
        );
        self.log.save()?;

        TraceEvent::SceneSummarized {
            start,
            end,
            chunked,
            summary_chars: summary.len(),
        }
        .emit();
        Ok(summary)
    }

    /// Fill the gap between the scene watermark and the end of the log with
    /// fixed-size chapters. The trailing partial block is left alone.
    /// Returns how many chapters were created.
    pub async fn auto_fill(&mut self, interval: usize) -> Result<usize> {
        if interval < MIN_FILL_INTERVAL {
            return Err(Error::InvalidParam(format!(
                "auto-fill interval must be at least {MIN_FILL_INTERVAL}, got {interval}"
            )));
        }

        let mut cursor = Timeline::watermark(&self.log).map(|i| i + 1).unwrap_or(0);
        let mut created = 0;
        while cursor + interval <= self.log.len() {
            let block_end = cursor + interval - 1;

            // A scene boundary inside the block means this stretch was
            // already summarized under a different interval; skip past it.
            if let Some(boundary) = (cursor..=block_end)
                .find(|&i| self.log.get(i).map(|m| m.meta.scene_end).unwrap_or(false))
            {
                cursor = boundary + 1;
                continue;
            }

            match self.summarize_scene(cursor, block_end).await {
                Ok(_) => {
                    TraceEvent::AutoFillBlock {
                        start: cursor,
                        end: block_end,
                        ok: true,
                    }
                    .emit();
                    created += 1;
                    cursor = block_end + 1;
                }
                Err(e) => {
                    tracing::warn!(
                        start = cursor,
                        end = block_end,
                        error = %e,
                        "auto-fill block failed; advancing one message"
                    );
                    TraceEvent::AutoFillBlock {
                        start: cursor,
                        end: block_end,
                        ok: false,
                    }
                    .emit();
                    cursor += 1;
                }
            }
        }
        Ok(created)
    }

    /// Replace the summary text of chapter `number` (1-indexed), in both
    /// the timeline and the backing scene metadata.
    pub fn edit_chapter(&mut self, number: usize, summary: &str) -> Result<bool> {
        let end = match self.timeline.chapters().get(number.wrapping_sub(1)) {
            Some(ch) => ch.end,
            None => return Ok(false),
        };
        self.timeline.edit(number, summary);
        if let Some(msg) = self.log.get_mut(end) {
            msg.meta.scene_summary = Some(summary.to_owned());
        }
        self.memory.rebuild(&self.log, &self.config.retrieval);
        self.log.save()?;
        Ok(true)
    }

    /// Remove chapter `number` (1-indexed) and clear the scene metadata on
    /// its end message, so the watermark recedes with it.
    pub fn remove_chapter(&mut self, number: usize) -> Result<Option<Chapter>> {
        let removed = match self.timeline.remove(number) {
            Some(ch) => ch,
            None => return Ok(None),
        };
        if let Some(msg) = self.log.get_mut(removed.end) {
            msg.meta.scene_end = false;
            msg.meta.scene_summary = None;
            msg.meta.scene_start = None;
        }
        self.memory.rebuild(&self.log, &self.config.retrieval);
        self.log.save()?;
        Ok(Some(removed))
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Lifecycle, retrieval, export
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Route a chat event through the trigger state machine and execute the
    /// resulting action. Returns the action for observability.
    pub async fn handle_event(&mut self, event: TriggerEvent) -> Result<TriggerAction> {
        let action = self.router.on_event(event, &self.config.summarization);
        match action {
            TriggerAction::None => {}
            TriggerAction::Summarize(index) => {
                let already = self
                    .log
                    .get(index)
                    .map(|m| m.meta.summary.is_some())
                    .unwrap_or(true);
                if !already {
                    self.summarize_message(index).await?;
                }
            }
            TriggerAction::Resummarize(index) => {
                if let Some(msg) = self.log.get_mut(index) {
                    msg.meta.summary = None;
                }
                self.summarize_message(index).await?;
            }
            TriggerAction::RebuildCaches => self.rebuild_caches(),
        }

        // Interval triggering: once enough unsummarized messages pile up
        // past the watermark, fill them in as chapters.
        let interval = self.config.summarization.auto_fill_interval;
        if interval >= MIN_FILL_INTERVAL && matches!(event, TriggerEvent::Rendered { .. }) {
            let next = Timeline::watermark(&self.log).map(|i| i + 1).unwrap_or(0);
            if self.log.len() >= next + interval {
                self.auto_fill(interval).await?;
            }
        }
        Ok(action)
    }

    /// Rebuild timeline and memory from log metadata, e.g. after the host
    /// swapped the underlying chat.
    pub fn rebuild_caches(&mut self) {
        self.timeline = Timeline::rebuild_from_log(&self.log);
        self.memory.rebuild(&self.log, &self.config.retrieval);
        self.router = TriggerRouter::new();
    }

    /// Strip all summaries, unhide everything the system hid, and reset the
    /// caches. Returns (messages touched, messages unhidden).
    pub fn clear_all_summaries(&mut self) -> Result<(usize, usize)> {
        let mut touched = 0;
        let mut unhidden = 0;
        for msg in self.log.iter_mut() {
            if msg.meta.clear_summaries() {
                touched += 1;
            }
            if msg.meta.auto_hidden {
                msg.meta.auto_hidden = false;
                if msg.is_system {
                    msg.is_system = false;
                    unhidden += 1;
                }
            }
        }
        self.timeline = Timeline::new();
        self.memory.rebuild(&self.log, &self.config.retrieval);
        self.log.save()?;

        TraceEvent::SummariesCleared { touched, unhidden }.emit();
        Ok((touched, unhidden))
    }

    /// Retrieve memories for `query`, falling back to the latest visible
    /// user message when no query is given.
    pub fn retrieve(&self, query: Option<&str>) -> Vec<ScoredMemory> {
        let fallback;
        let query = match query {
            Some(q) => q,
            None => {
                fallback = self.log.last_user_body().unwrap_or("").to_owned();
                &fallback
            }
        };
        if query.trim().is_empty() {
            return Vec::new();
        }
        recap_memory::retrieve(&self.memory, query, Utc::now(), &self.config.retrieval)
    }

    pub fn status(&self) -> SessionStatus {
        let visible = self.log.iter().filter(|m| m.is_visible()).count();
        let summarized_messages = self
            .log
            .iter()
            .filter(|m| m.meta.summary.is_some())
            .count();
        SessionStatus {
            messages: self.log.len(),
            visible,
            summarized_messages,
            chapters: self.timeline.len(),
            memory_entries: self.memory.len(),
            watermark: Timeline::watermark(&self.log),
            context: ContextFigures::compute(
                &self.log,
                self.counter.as_ref(),
                self.config.summarization.replace_with_summary,
            ),
        }
    }

    /// Export all cached memories as one named document. Name collisions
    /// get a numeric suffix; the name actually used comes back.
    pub fn export_memories(&self, store: &DocumentStore, name: &str) -> Result<String> {
        let mut doc: BTreeMap<String, ExportedMemory> = BTreeMap::new();
        for entry in self.memory.all() {
            let key = match (entry.kind, entry.source_index) {
                (MemoryKind::Message, Some(i)) => format!("message-{i}"),
                (MemoryKind::Scene, Some(i)) => format!("scene-{i}"),
                _ => format!("custom-{}", entry.id),
            };
            doc.insert(
                key,
                ExportedMemory {
                    content: entry.summary,
                    keywords: entry.keywords,
                    metadata: ExportedMeta {
                        kind: entry.kind,
                        source_index: entry.source_index,
                        created_at: entry.created_at,
                    },
                },
            );
        }

        let actual = store.create(name)?;
        store.save(&actual, &doc)?;
        Ok(actual)
    }
}
