//! The chapter timeline: an ordered list of summarized message ranges.
//!
//! The list is the display/source of truth for chapter numbering, but the
//! scene-boundary watermark is always derived from message metadata
//! (`scene_end` flags), never stored redundantly — deleting a chapter must
//! clear both together, which [`crate::Session::remove_chapter`] does.

use serde::{Deserialize, Serialize};

use recap_chatlog::ChatLog;
use recap_domain::error::{Error, Result};
use recap_domain::trace::TraceEvent;

/// A contiguous message range collapsed into one summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub summary: String,
    /// First message index of the range (inclusive).
    pub start: usize,
    /// Last message index of the range (inclusive).
    pub end: usize,
}

/// Ordered chapter list. 1-indexed for external addressing, 0-indexed
/// internally.
#[derive(Debug, Default)]
pub struct Timeline {
    chapters: Vec<Chapter>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruct the timeline from chat-log metadata on load.
    ///
    /// Scene-end messages carry their range (`scene_start`) and summary, so
    /// the list is fully derivable; entries with missing pieces are skipped
    /// with a warning rather than invented.
    pub fn rebuild_from_log(log: &ChatLog) -> Self {
        let mut chapters = Vec::new();
        for (index, msg) in log.iter().enumerate() {
            if !msg.meta.scene_end {
                continue;
            }
            match (&msg.meta.scene_summary, msg.meta.scene_start) {
                (Some(summary), Some(start)) => chapters.push(Chapter {
                    summary: summary.clone(),
                    start,
                    end: index,
                }),
                _ => {
                    tracing::warn!(
                        index,
                        "scene_end without summary/start metadata; skipping chapter"
                    );
                }
            }
        }
        Self { chapters }
    }

    /// The nearest scene-end index strictly before `before`, or `None`.
    ///
    /// Callers use `result + 1` (or 0) as the next scene's start, which is
    /// how ranges stay contiguous without storing a "next start" anywhere.
    pub fn last_scene_end(log: &ChatLog, before: usize) -> Option<usize> {
        (0..before.min(log.len()))
            .rev()
            .find(|&i| log.get(i).map(|m| m.meta.scene_end).unwrap_or(false))
    }

    /// The watermark: highest message index covered by a completed scene.
    pub fn watermark(log: &ChatLog) -> Option<usize> {
        Self::last_scene_end(log, log.len())
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Append a chapter, enforcing non-overlap and increasing order.
    pub fn push(&mut self, chapter: Chapter) -> Result<()> {
        if chapter.start > chapter.end {
            return Err(Error::Range(format!(
                "chapter start {} after end {}",
                chapter.start, chapter.end
            )));
        }
        if let Some(last) = self.chapters.last() {
            if chapter.start <= last.end {
                return Err(Error::InvalidParam(format!(
                    "chapter range {}..={} overlaps previous chapter ending at {}",
                    chapter.start, chapter.end, last.end
                )));
            }
        }

        TraceEvent::ChapterAdded {
            number: self.chapters.len() + 1,
            start: chapter.start,
            end: chapter.end,
        }
        .emit();
        self.chapters.push(chapter);
        Ok(())
    }

    /// Replace the summary text of chapter `number` (1-indexed). The index
    /// range is immutable once created. Returns false for an out-of-range
    /// number.
    pub fn edit(&mut self, number: usize, summary: &str) -> bool {
        if number == 0 || number > self.chapters.len() {
            return false;
        }
        self.chapters[number - 1].summary = summary.to_owned();
        true
    }

    /// Remove chapter `number` (1-indexed). Later chapters shift down in
    /// number but keep their stored index ranges.
    pub fn remove(&mut self, number: usize) -> Option<Chapter> {
        if number == 0 || number > self.chapters.len() {
            return None;
        }
        let chapter = self.chapters.remove(number - 1);
        TraceEvent::ChapterRemoved {
            number,
            start: chapter.start,
            end: chapter.end,
        }
        .emit();
        Some(chapter)
    }

    /// Human-readable rendering for the `timeline` command.
    pub fn render(&self) -> String {
        if self.chapters.is_empty() {
            return "(no chapters)".into();
        }
        let mut out = String::new();
        for (i, ch) in self.chapters.iter().enumerate() {
            out.push_str(&format!(
                "Chapter {} (messages {}-{}): {}\n",
                i + 1,
                ch.start,
                ch.end,
                ch.summary
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_chatlog::ChatMessage;

    fn chapter(start: usize, end: usize) -> Chapter {
        Chapter {
            summary: format!("ch {start}-{end}"),
            start,
            end,
        }
    }

    #[test]
    fn push_enforces_order_and_overlap() {
        let mut tl = Timeline::new();
        tl.push(chapter(0, 9)).unwrap();
        tl.push(chapter(10, 19)).unwrap();

        assert!(tl.push(chapter(15, 25)).is_err()); // overlap
        assert!(tl.push(chapter(30, 20)).is_err()); // inverted
        assert_eq!(tl.len(), 2);
    }

    #[test]
    fn chapters_stay_non_overlapping_increasing() {
        let mut tl = Timeline::new();
        tl.push(chapter(0, 4)).unwrap();
        tl.push(chapter(7, 9)).unwrap(); // gap is fine (explicit auto-fill skips)
        let chs = tl.chapters();
        for pair in chs.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn edit_replaces_summary_only() {
        let mut tl = Timeline::new();
        tl.push(chapter(0, 4)).unwrap();

        assert!(tl.edit(1, "better summary"));
        assert_eq!(tl.chapters()[0].summary, "better summary");
        assert_eq!(tl.chapters()[0].end, 4);

        assert!(!tl.edit(0, "x"));
        assert!(!tl.edit(2, "x"));
    }

    #[test]
    fn remove_shifts_numbers_not_ranges() {
        let mut tl = Timeline::new();
        tl.push(chapter(0, 4)).unwrap();
        tl.push(chapter(5, 9)).unwrap();
        tl.push(chapter(10, 14)).unwrap();

        let removed = tl.remove(2).unwrap();
        assert_eq!(removed.start, 5);

        // formerly chapters 1 and 3, now numbered 1 and 2, ranges unchanged
        assert_eq!(tl.len(), 2);
        assert_eq!(tl.chapters()[0].start, 0);
        assert_eq!(tl.chapters()[1].start, 10);
        assert_eq!(tl.chapters()[1].end, 14);
    }

    #[test]
    fn watermark_from_metadata() {
        let mut msgs: Vec<ChatMessage> = (0..5)
            .map(|i| ChatMessage::user("A", &format!("m{i}")))
            .collect();
        msgs[2].meta.scene_end = true;
        let log = ChatLog::from_messages(msgs);

        assert_eq!(Timeline::watermark(&log), Some(2));
        assert_eq!(Timeline::last_scene_end(&log, 2), None);
        assert_eq!(Timeline::last_scene_end(&log, 5), Some(2));
    }

    #[test]
    fn rebuild_from_log_collects_complete_scenes() {
        let mut msgs: Vec<ChatMessage> = (0..6)
            .map(|i| ChatMessage::user("A", &format!("m{i}")))
            .collect();
        msgs[2].meta.scene_end = true;
        msgs[2].meta.scene_summary = Some("first scene".into());
        msgs[2].meta.scene_start = Some(0);
        msgs[5].meta.scene_end = true; // incomplete: no summary/start
        let log = ChatLog::from_messages(msgs);

        let tl = Timeline::rebuild_from_log(&log);
        assert_eq!(tl.len(), 1);
        assert_eq!(tl.chapters()[0].end, 2);
    }
}
