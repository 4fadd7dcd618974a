use serde::Serialize;

/// Structured trace events emitted across all Recap crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    GenerationCall {
        model: String,
        duration_ms: u64,
        output_chars: usize,
    },
    RateLimitWait {
        wait_ms: u64,
    },
    MessageSummarized {
        index: usize,
        summary_chars: usize,
    },
    SceneSummarized {
        start: usize,
        end: usize,
        chunked: bool,
        summary_chars: usize,
    },
    ChunkReduce {
        groups: usize,
        pass: usize,
    },
    ChapterAdded {
        number: usize,
        start: usize,
        end: usize,
    },
    ChapterRemoved {
        number: usize,
        start: usize,
        end: usize,
    },
    AutoFillBlock {
        start: usize,
        end: usize,
        ok: bool,
    },
    AutoHide {
        hidden: usize,
        kept: usize,
    },
    MemoryRebuilt {
        message_entries: usize,
        scene_entries: usize,
        custom_entries: usize,
    },
    RetrievalRun {
        query_words: usize,
        hits: usize,
    },
    ChatPersisted {
        path: String,
        messages: usize,
    },
    SummariesCleared {
        touched: usize,
        unhidden: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "recap_event");
    }
}
