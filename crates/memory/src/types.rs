use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a memory entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    /// Summary of a single message.
    Message,
    /// Summary of a scene/chapter range.
    Scene,
    /// Supplied out-of-band; has no backing message metadata and must be
    /// retained verbatim across cache rebuilds.
    Custom,
}

/// One cached summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub kind: MemoryKind,
    /// Source message index for `Message` entries, scene end index for
    /// `Scene` entries, `None` for `Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(
        kind: MemoryKind,
        source_index: Option<usize>,
        summary: &str,
        keywords: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            source_index,
            summary: summary.to_owned(),
            keywords,
            created_at,
        }
    }
}
