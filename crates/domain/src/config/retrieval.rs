use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Memory retrieval
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tuning for the lexical memory retrieval heuristic. This is word-overlap
/// scoring with time decay, not semantic search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum number of memories returned per query.
    #[serde(default = "d_5")]
    pub max_retrieved: usize,
    /// Score penalty per day of entry age.
    #[serde(default = "d_decay")]
    pub decay_per_day: f64,
    /// Query words shorter than this are ignored.
    #[serde(default = "d_3")]
    pub min_word_len: usize,
    /// Keywords extracted and stored per memory entry.
    #[serde(default = "d_8")]
    pub max_keywords: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_retrieved: 5,
            decay_per_day: 0.1,
            min_word_len: 3,
            max_keywords: 8,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_5() -> usize {
    5
}
fn d_decay() -> f64 {
    0.1
}
fn d_3() -> usize {
    3
}
fn d_8() -> usize {
    8
}
