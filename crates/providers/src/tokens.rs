//! Token counting seam.
//!
//! Accounting and chunking only need counts relative to the model's budget,
//! so the default is a cheap character heuristic. A real tokenizer can be
//! injected behind [`TokenCounter`] without touching callers.

/// Counts tokens in a piece of text.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Roughly one token per four characters, never less than the word count.
///
/// Matches the common BPE rule of thumb for English prose; slightly
/// overcounts dense punctuation, which errs on the safe side for budgets.
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let by_chars = text.chars().count().div_ceil(4);
        let by_words = text.split_whitespace().count();
        by_chars.max(by_words)
    }
}
