mod cli;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let Cli {
        chat,
        config: config_flag,
        command,
    } = Cli::parse();
    let config = cli::load_config(config_flag.as_deref())?;
    let chat = chat.as_deref();

    match command {
        Command::Init => cli::init::init(),
        Command::Preset(command) => cli::run::preset(&config, command),
        Command::Summarize { index } => {
            let mut session = cli::run::build_session(require_chat(chat)?, config)?;
            cli::run::summarize(&mut session, index).await
        }
        Command::SceneEnd { index } => {
            let mut session = cli::run::build_session(require_chat(chat)?, config)?;
            cli::run::scene_end(&mut session, index).await
        }
        Command::Autofill { interval } => {
            let mut session = cli::run::build_session(require_chat(chat)?, config)?;
            cli::run::autofill(&mut session, interval).await
        }
        Command::SummarizeAll => {
            let mut session = cli::run::build_session(require_chat(chat)?, config)?;
            cli::run::summarize_all(&mut session).await
        }
        Command::ClearSummaries => {
            let mut session = cli::run::build_session(require_chat(chat)?, config)?;
            cli::run::clear_summaries(&mut session)
        }
        Command::Status { json } => {
            let session = cli::run::build_session(require_chat(chat)?, config)?;
            cli::run::status(&session, json)
        }
        Command::Retrieve { query } => {
            let session = cli::run::build_session(require_chat(chat)?, config)?;
            cli::run::retrieve(&session, query.as_deref())
        }
        Command::Timeline { action } => {
            let mut session = cli::run::build_session(require_chat(chat)?, config)?;
            cli::run::timeline(&mut session, action)
        }
        Command::ExportMemories { name } => {
            let session = cli::run::build_session(require_chat(chat)?, config)?;
            cli::run::export_memories(&session, name)
        }
    }
}

fn require_chat(chat: Option<&Path>) -> anyhow::Result<&Path> {
    chat.ok_or_else(|| anyhow::anyhow!("--chat <file.jsonl> is required for this command"))
}

/// Compact stderr tracing so diagnostics never pollute stdout. Filter
/// comes from `RECAP_LOG` (default `warn`).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RECAP_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
