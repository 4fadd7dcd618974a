use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// On-disk storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding exported memory documents and preset snapshots.
    #[serde(default = "d_data_dir")]
    pub data_dir: PathBuf,
    /// Document name memories are exported under.
    #[serde(default = "d_memories")]
    pub memory_store_name: String,
    /// Document name preset snapshots are kept under.
    #[serde(default = "d_presets")]
    pub preset_store_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: d_data_dir(),
            memory_store_name: d_memories(),
            preset_store_name: d_presets(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_data_dir() -> PathBuf {
    PathBuf::from("recap-data")
}
fn d_memories() -> String {
    "memories".into()
}
fn d_presets() -> String {
    "presets".into()
}
