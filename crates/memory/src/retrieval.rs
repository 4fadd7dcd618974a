//! Relevance-ranked memory retrieval.
//!
//! Deliberately a cheap lexical heuristic, not semantic search: an entry
//! scores one point per query word that appears as a substring of any word
//! in its summary, minus a decay penalty per day of age. Stable sort keeps
//! equal-score entries in chronological (insertion) order.

use chrono::{DateTime, Utc};

use recap_domain::config::RetrievalConfig;
use recap_domain::trace::TraceEvent;

use crate::store::MemoryStore;
use crate::types::MemoryEntry;

/// A retrieval hit.
#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub entry: MemoryEntry,
    pub score: f64,
}

/// Score every cached entry against `query` and return the top hits.
pub fn retrieve(
    store: &MemoryStore,
    query: &str,
    now: DateTime<Utc>,
    cfg: &RetrievalConfig,
) -> Vec<ScoredMemory> {
    let query_words = tokenize(query, cfg.min_word_len);
    if query_words.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<ScoredMemory> = store
        .all()
        .into_iter()
        .filter_map(|entry| {
            let overlap = overlap_score(&query_words, &entry.summary);
            if overlap == 0 {
                return None;
            }
            let age_days = (now - entry.created_at).num_seconds().max(0) as f64 / 86_400.0;
            let score = overlap as f64 - cfg.decay_per_day * age_days;
            (score > 0.0).then_some(ScoredMemory { entry, score })
        })
        .collect();

    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(cfg.max_retrieved);

    TraceEvent::RetrievalRun {
        query_words: query_words.len(),
        hits: hits.len(),
    }
    .emit();
    hits
}

/// Count query words that appear as a substring of any word in `summary`.
fn overlap_score(query_words: &[String], summary: &str) -> usize {
    let summary_words: Vec<String> = summary
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect();

    query_words
        .iter()
        .filter(|qw| summary_words.iter().any(|sw| sw.contains(qw.as_str())))
        .count()
}

/// Lowercase alphanumeric words of at least `min_len` characters.
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= min_len)
        .map(String::from)
        .collect()
}

/// Pick the most frequent distinct words of a summary as its keywords.
pub fn extract_keywords(summary: &str, cfg: &RetrievalConfig) -> Vec<String> {
    let words = tokenize(summary, cfg.min_word_len.max(4));
    let mut counts: Vec<(String, usize)> = Vec::new();
    for word in words {
        match counts.iter_mut().find(|(w, _)| *w == word) {
            Some((_, c)) => *c += 1,
            None => counts.push((word, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(cfg.max_keywords);
    counts.into_iter().map(|(w, _)| w).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemoryKind;
    use chrono::Duration;

    fn cfg() -> RetrievalConfig {
        RetrievalConfig::default()
    }

    fn store_with(entries: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for e in entries {
            store.record(MemoryKind::Message, None, e, &cfg());
        }
        store
    }

    #[test]
    fn relevant_entry_ranks_first() {
        let store = store_with(&[
            "they discussed the weather at length",
            "a dragon attacked the village at dawn",
        ]);
        let hits = retrieve(&store, "dragon attacked village", Utc::now(), &cfg());
        assert!(!hits.is_empty());
        assert!(hits[0].entry.summary.contains("dragon"));
    }

    #[test]
    fn unrelated_entries_filtered_out() {
        let store = store_with(&["quiet morning in the garden"]);
        let hits = retrieve(&store, "dragon attacked village", Utc::now(), &cfg());
        assert!(hits.is_empty());
    }

    #[test]
    fn short_query_words_ignored() {
        let store = store_with(&["it is so"]);
        // every query word is under the length-3 floor
        let hits = retrieve(&store, "it is so", Utc::now(), &cfg());
        assert!(hits.is_empty());
    }

    #[test]
    fn substring_matching_counts() {
        let store = store_with(&["the dragons were furious"]);
        // "dragon" is a substring of "dragons"
        let hits = retrieve(&store, "dragon", Utc::now(), &cfg());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn decay_penalizes_old_entries() {
        let store = store_with(&["dragon sighting"]);
        let now = Utc::now();

        let fresh = retrieve(&store, "dragon", now, &cfg());
        let aged = retrieve(&store, "dragon", now + Duration::days(5), &cfg());

        // 1.0 overlap, minus 0.1/day for five days
        assert!(fresh[0].score > aged[0].score);
        assert!((aged[0].score - 0.5).abs() < 0.01);
    }

    #[test]
    fn score_zero_after_decay_is_dropped() {
        let store = MemoryStore::new();
        store.record_custom("dragon", vec![]);
        // 1 point of overlap, 12 days of decay -> negative score
        let later = Utc::now() + Duration::days(12);
        let hits = retrieve(&store, "dragon", later, &cfg());
        assert!(hits.is_empty());
    }

    #[test]
    fn truncates_to_max_retrieved() {
        let store = MemoryStore::new();
        for i in 0..10 {
            store.record_custom(&format!("dragon event number {i}"), vec![]);
        }
        let hits = retrieve(&store, "dragon", Utc::now(), &cfg());
        assert_eq!(hits.len(), cfg().max_retrieved);
    }

    #[test]
    fn empty_query_returns_nothing() {
        let store = store_with(&["anything"]);
        assert!(retrieve(&store, "a an of", Utc::now(), &cfg()).is_empty());
    }

    #[test]
    fn keywords_are_frequent_long_words() {
        let kws = extract_keywords("dragon dragon village fire fire fire", &cfg());
        assert_eq!(kws[0], "fire");
        assert_eq!(kws[1], "dragon");
    }
}
