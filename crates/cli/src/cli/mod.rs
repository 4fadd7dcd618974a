pub mod init;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use recap_domain::config::Config;

/// Recap — summarization and memory for long chat logs.
#[derive(Debug, Parser)]
#[command(name = "recap", version, about)]
pub struct Cli {
    /// Chat log file (JSONL). Required by every command except `init` and
    /// `preset`.
    #[arg(long, global = true)]
    pub chat: Option<PathBuf>,

    /// Config file path (defaults to `$RECAP_CONFIG`, then `recap.toml`).
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scaffold a recap.toml and data directory in the current directory.
    Init,
    /// Summarize a single message.
    Summarize {
        /// Message index (0-based).
        index: usize,
    },
    /// Close the scene ending at a message: summarize everything since the
    /// previous scene boundary.
    SceneEnd {
        /// Index of the scene's last message.
        index: usize,
    },
    /// Fill everything past the last scene boundary with fixed-size
    /// chapters.
    Autofill {
        /// Messages per chapter (minimum 5).
        interval: usize,
    },
    /// Summarize every visible message that has no summary yet.
    SummarizeAll,
    /// Strip all summaries and restore messages the system hid.
    ClearSummaries,
    /// Print message counts, chapter count, and token figures.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Look up memories matching a query (default: the latest user
    /// message).
    Retrieve { query: Option<String> },
    /// Show the chapter timeline, or edit/remove a chapter.
    Timeline {
        #[command(subcommand)]
        action: Option<TimelineCommand>,
    },
    /// Export all cached memories as one JSON document in the data
    /// directory.
    ExportMemories {
        /// Document name (default from config).
        name: Option<String>,
    },
    /// Manage named config presets.
    #[command(subcommand)]
    Preset(PresetCommand),
}

#[derive(Debug, Subcommand)]
pub enum TimelineCommand {
    /// Replace the summary text of a chapter (1-indexed).
    Edit { number: usize, summary: String },
    /// Remove a chapter (1-indexed). Later chapters shift down in number.
    Remove { number: usize },
}

#[derive(Debug, Subcommand)]
pub enum PresetCommand {
    /// Snapshot the current config sections under a name.
    Save { name: String },
    /// Delete a preset.
    Delete { name: String },
    /// List preset names.
    List,
    /// Write a preset to a standalone JSON file.
    Export { name: String, path: PathBuf },
    /// Import a preset file written by `preset export`.
    Import { path: PathBuf },
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the config from the `--config` flag, `$RECAP_CONFIG`, or
/// `recap.toml`. A missing file means defaults, not an error; a malformed
/// file is reported with its path.
pub fn load_config(flag: Option<&str>) -> anyhow::Result<Config> {
    let path = flag
        .map(str::to_owned)
        .or_else(|| std::env::var("RECAP_CONFIG").ok())
        .unwrap_or_else(|| "recap.toml".into());

    if std::path::Path::new(&path).exists() {
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
    } else {
        Ok(Config::default())
    }
}
