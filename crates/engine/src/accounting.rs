//! Token accounting over the effective prompt.
//!
//! Two views are always computed together: what the current settings
//! actually save, and what replacement *would* save if it were enabled.
//! System messages (hidden entries) are excluded from the original total
//! since they never reach the prompt in the first place.

use serde::Serialize;

use recap_chatlog::ChatLog;
use recap_providers::TokenCounter;

/// Prompt-size figures for the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct ContextFigures {
    /// Tokens of all non-system message bodies as written.
    pub original: usize,
    /// Tokens actually sent under current replacement settings.
    pub effective: usize,
    /// `original - effective`; negative when summaries run longer than
    /// their sources.
    pub saved: i64,
    pub saved_percent: i64,
    /// Figures as if summary replacement were enabled for every
    /// summarized message.
    pub potential_effective: usize,
    pub potential_saved: i64,
    pub potential_saved_percent: i64,
}

impl ContextFigures {
    pub fn compute(log: &ChatLog, counter: &dyn TokenCounter, replace_active: bool) -> Self {
        let mut original = 0usize;
        let mut effective = 0usize;
        let mut potential_effective = 0usize;

        for msg in log.iter() {
            if msg.is_system {
                continue;
            }
            let body_tokens = counter.count(&msg.body);
            original += body_tokens;

            let summary_tokens = msg.meta.summary.as_deref().map(|s| counter.count(s));
            match summary_tokens {
                Some(st) => {
                    effective += if replace_active { st } else { body_tokens };
                    potential_effective += st;
                }
                None => {
                    effective += body_tokens;
                    potential_effective += body_tokens;
                }
            }
        }

        let saved = original as i64 - effective as i64;
        let potential_saved = original as i64 - potential_effective as i64;
        Self {
            original,
            effective,
            saved,
            saved_percent: percent(saved, original),
            potential_effective,
            potential_saved,
            potential_saved_percent: percent(potential_saved, original),
        }
    }
}

fn percent(saved: i64, original: usize) -> i64 {
    if original == 0 {
        return 0;
    }
    (saved as f64 / original as f64 * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_chatlog::ChatMessage;
    use recap_providers::HeuristicCounter;

    fn log_with_one_summary() -> ChatLog {
        // 400-char body = 100 tokens; 40-char summary = 10 tokens.
        let mut long = ChatMessage::user("A", &"x".repeat(400));
        long.meta.summary = Some("y".repeat(40));
        let plain = ChatMessage::character("B", &"z".repeat(200));
        ChatLog::from_messages(vec![long, plain])
    }

    #[test]
    fn replacement_off_saves_nothing_but_reports_potential() {
        let log = log_with_one_summary();
        let f = ContextFigures::compute(&log, &HeuristicCounter, false);
        assert_eq!(f.original, 150);
        assert_eq!(f.effective, 150);
        assert_eq!(f.saved, 0);
        assert_eq!(f.saved_percent, 0);
        assert_eq!(f.potential_effective, 60);
        assert_eq!(f.potential_saved, 90);
        assert_eq!(f.potential_saved_percent, 60);
    }

    #[test]
    fn replacement_on_counts_summaries() {
        let log = log_with_one_summary();
        let f = ContextFigures::compute(&log, &HeuristicCounter, true);
        assert_eq!(f.effective, 60);
        assert_eq!(f.saved, 90);
        assert_eq!(f.saved, f.potential_saved);
    }

    #[test]
    fn summary_longer_than_source_goes_negative() {
        let mut msg = ChatMessage::user("A", "hi"); // 1 token
        msg.meta.summary = Some("w".repeat(80)); // 20 tokens
        let log = ChatLog::from_messages(vec![msg]);

        let f = ContextFigures::compute(&log, &HeuristicCounter, true);
        assert!(f.saved < 0);
        assert!(f.saved_percent < 0);
    }

    #[test]
    fn system_messages_excluded() {
        let mut hidden = ChatMessage::user("A", &"x".repeat(400));
        hidden.is_system = true;
        let log = ChatLog::from_messages(vec![hidden]);

        let f = ContextFigures::compute(&log, &HeuristicCounter, true);
        assert_eq!(f.original, 0);
        assert_eq!(f.saved_percent, 0);
    }
}
