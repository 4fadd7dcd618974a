//! Hierarchical chunked summarization for content that exceeds the model's
//! context budget.
//!
//! Units are packed greedily into token-bounded groups, each group is
//! summarized independently, and the group summaries are re-summarized
//! until one remains. The reduction is a bounded loop, not open recursion:
//! after [`MAX_REDUCE_PASSES`] the joined text is truncated to the budget
//! and summarized one last time, so termination is guaranteed even for
//! pathological inputs.

use std::future::Future;

use recap_domain::error::Result;
use recap_domain::trace::TraceEvent;
use recap_providers::TokenCounter;

/// Upper bound on reduction passes before the truncation fallback kicks in.
pub const MAX_REDUCE_PASSES: usize = 4;

/// Separator between group summaries in reduction passes.
const GROUP_SEPARATOR: &str = "\n\n---\n\n";

/// Greedily pack `units` into consecutive groups whose cumulative token
/// count stays within `budget`.
///
/// A single unit that alone exceeds the budget is placed in its own group
/// rather than split mid-unit — the group then exceeds the budget, which is
/// accepted degradation, not an error.
pub fn pack_groups<'a>(
    units: &'a [String],
    budget: usize,
    counter: &dyn TokenCounter,
) -> Vec<Vec<&'a str>> {
    let mut groups: Vec<Vec<&'a str>> = Vec::new();
    let mut current: Vec<&'a str> = Vec::new();
    let mut current_tokens = 0usize;

    for unit in units {
        let tokens = counter.count(unit);

        if tokens > budget {
            // Oversized unit: flush whatever is pending, then isolate it.
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
                current_tokens = 0;
            }
            groups.push(vec![unit.as_str()]);
            continue;
        }

        if current_tokens + tokens > budget && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        current.push(unit.as_str());
        current_tokens += tokens;
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Summarize an ordered list of text units whose total size may exceed the
/// token budget.
///
/// Returns the single final summary, or an empty string when no unit
/// produced output. `summarize` is called once per group and once per
/// reduction pass; it never receives a group over budget unless a single
/// unit alone exceeds it.
pub async fn summarize_large<F, Fut>(
    units: &[String],
    budget: usize,
    counter: &dyn TokenCounter,
    summarize: F,
) -> Result<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    if units.is_empty() {
        return Ok(String::new());
    }

    let mut current: Vec<String> = units.to_vec();

    for pass in 0..MAX_REDUCE_PASSES {
        let joiner = if pass == 0 { "\n\n" } else { GROUP_SEPARATOR };
        let groups = pack_groups(&current, budget, counter);

        TraceEvent::ChunkReduce {
            groups: groups.len(),
            pass,
        }
        .emit();

        let mut summaries: Vec<String> = Vec::new();
        for group in &groups {
            let content = group.join(joiner);
            let summary = summarize(content).await?;
            if !summary.is_empty() {
                summaries.push(summary);
            }
        }

        match summaries.len() {
            0 => return Ok(String::new()),
            1 => return Ok(summaries.remove(0)),
            _ => current = summaries,
        }
    }

    // Passes exhausted and still more than one summary: truncate the joined
    // remainder to the budget and summarize once more.
    let joined = current.join(GROUP_SEPARATOR);
    let truncated = truncate_to_tokens(&joined, budget, counter);
    tracing::warn!(
        passes = MAX_REDUCE_PASSES,
        remaining = current.len(),
        "chunk reduction budget not reached; truncating before final pass"
    );
    summarize(truncated).await
}

/// Cut `text` so its token count fits `budget`, at a char boundary.
fn truncate_to_tokens(text: &str, budget: usize, counter: &dyn TokenCounter) -> String {
    if counter.count(text) <= budget {
        return text.to_owned();
    }
    // Tokens scale roughly with length, so cut proportionally and back off
    // until the counter agrees.
    let mut keep = text.len() * budget / counter.count(text).max(1);
    loop {
        while keep > 0 && !text.is_char_boundary(keep) {
            keep -= 1;
        }
        let candidate = &text[..keep];
        if keep == 0 || counter.count(candidate) <= budget {
            return format!("{candidate}\n\n[TRUNCATED]");
        }
        keep = keep.saturating_sub(keep / 8).saturating_sub(1);
    }
}
