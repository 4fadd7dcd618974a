//! `recap init` — scaffold a config file and data directory.

use std::path::Path;

/// Scaffold a new Recap setup in the current directory.
pub fn init() -> anyhow::Result<()> {
    init_in(Path::new("."))
}

// ── Core implementation (directory-parameterised for testability) ─────

fn init_in(base: &Path) -> anyhow::Result<()> {
    let config_path = base.join("recap.toml");
    if config_path.exists() {
        anyhow::bail!("recap.toml already exists. Use a different directory or remove it first.");
    }

    std::fs::write(&config_path, render_config())?;
    std::fs::create_dir_all(base.join("recap-data"))?;

    eprintln!();
    eprintln!("  Recap initialized!");
    eprintln!();
    eprintln!("  Created:");
    eprintln!("    recap.toml    - configuration (set base_url and your API key env var)");
    eprintln!("    recap-data/   - memory exports and presets");
    eprintln!();
    eprintln!("  Next: export RECAP_API_KEY and run");
    eprintln!("    recap --chat your-chat.jsonl status");
    eprintln!();
    Ok(())
}

fn render_config() -> String {
    r#"# Recap configuration. Every key has a default; uncomment to override.

[generation]
# OpenAI-compatible chat completions endpoint.
# base_url = "https://api.openai.com/v1"
# api_key_env = "RECAP_API_KEY"
# model = "gpt-4o-mini"
# max_response_tokens = 500
# context_limit_tokens = 8192
# rate_per_minute = 60
# temperature = 0.1

[summarization]
# replace_with_summary = false
# auto_hide = false
# keep_recent_count = 10
# hide_summarized_scenes = false
# auto_summarize = false
# auto_fill_interval = 0

[retrieval]
# max_retrieved = 5
# decay_per_day = 0.1

[storage]
# data_dir = "recap-data"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_domain::config::Config;

    #[test]
    fn init_creates_config_and_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        init_in(dir.path()).unwrap();

        assert!(dir.path().join("recap.toml").exists());
        assert!(dir.path().join("recap-data").is_dir());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        init_in(dir.path()).unwrap();
        assert!(init_in(dir.path()).is_err());
    }

    #[test]
    fn rendered_config_parses() {
        let config: Config = toml::from_str(&render_config()).unwrap();
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.storage.data_dir, Path::new("recap-data"));
    }
}
