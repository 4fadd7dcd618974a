//! Command implementations over a loaded session.

use std::path::Path;
use std::sync::Arc;

use recap_chatlog::ChatLog;
use recap_domain::config::Config;
use recap_domain::error::{Error, Result};
use recap_engine::{Presets, Session, Timeline};
use recap_memory::DocumentStore;
use recap_providers::{
    GenerateRequest, GenerateResponse, GenerationGateway, Generator, HeuristicCounter,
    OpenAiCompatClient,
};

use crate::cli::{PresetCommand, TimelineCommand};

/// Stand-in backend when no endpoint is configured. Read-only commands
/// still work; any generation attempt surfaces the configuration problem.
struct UnconfiguredGenerator;

#[async_trait::async_trait]
impl Generator for UnconfiguredGenerator {
    async fn complete(&self, _req: &GenerateRequest) -> Result<GenerateResponse> {
        Err(Error::Generation(
            "no summarization endpoint configured; set [generation] base_url in recap.toml".into(),
        ))
    }

    fn backend_id(&self) -> &str {
        "unconfigured"
    }
}

/// Load the chat log and assemble a session around it.
pub fn build_session(chat: &Path, config: Config) -> anyhow::Result<Session> {
    let log = ChatLog::load(chat)?;
    let generator: Arc<dyn Generator> = match OpenAiCompatClient::from_config(&config.generation) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::debug!(error = %e, "generation backend unavailable");
            Arc::new(UnconfiguredGenerator)
        }
    };
    let gateway = Arc::new(GenerationGateway::new(generator, &config.generation));
    Ok(Session::new(log, gateway, Arc::new(HeuristicCounter), config))
}

pub async fn summarize(session: &mut Session, index: usize) -> anyhow::Result<()> {
    let summary = session.summarize_message(index).await?;
    if summary.is_empty() {
        println!("no summary produced");
    } else {
        println!("{summary}");
    }
    Ok(())
}

pub async fn scene_end(session: &mut Session, end: usize) -> anyhow::Result<()> {
    let start = Timeline::last_scene_end(session.log(), end)
        .map(|i| i + 1)
        .unwrap_or(0);
    let summary = session.summarize_scene(start, end).await?;
    println!(
        "chapter {} (messages {start}-{end}):\n{summary}",
        session.timeline().len()
    );
    Ok(())
}

pub async fn autofill(session: &mut Session, interval: usize) -> anyhow::Result<()> {
    let created = session.auto_fill(interval).await?;
    println!("created {created} chapter(s)");
    Ok(())
}

pub async fn summarize_all(session: &mut Session) -> anyhow::Result<()> {
    let produced = session.summarize_all().await?;
    println!("produced {produced} summarie(s)");
    Ok(())
}

pub fn clear_summaries(session: &mut Session) -> anyhow::Result<()> {
    let (touched, unhidden) = session.clear_all_summaries()?;
    println!("cleared summaries on {touched} message(s), restored {unhidden} hidden");
    Ok(())
}

pub fn status(session: &Session, json: bool) -> anyhow::Result<()> {
    let status = session.status();
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("messages:    {} ({} visible)", status.messages, status.visible);
    println!("summarized:  {}", status.summarized_messages);
    println!("chapters:    {}", status.chapters);
    println!("memories:    {}", status.memory_entries);
    match status.watermark {
        Some(i) => println!("watermark:   message {i}"),
        None => println!("watermark:   none"),
    }
    let ctx = &status.context;
    println!(
        "context:     {} tokens, {} effective ({}% saved)",
        ctx.original, ctx.effective, ctx.saved_percent
    );
    println!(
        "potential:   {} effective ({}% saved with replacement on)",
        ctx.potential_effective, ctx.potential_saved_percent
    );
    Ok(())
}

pub fn retrieve(session: &Session, query: Option<&str>) -> anyhow::Result<()> {
    let hits = session.retrieve(query);
    if hits.is_empty() {
        println!("no memories matched");
        return Ok(());
    }
    for hit in hits {
        println!("[{:.2}] {}", hit.score, hit.entry.summary);
    }
    Ok(())
}

pub fn timeline(session: &mut Session, action: Option<TimelineCommand>) -> anyhow::Result<()> {
    match action {
        None => println!("{}", session.timeline().render()),
        Some(TimelineCommand::Edit { number, summary }) => {
            if session.edit_chapter(number, &summary)? {
                println!("chapter {number} updated");
            } else {
                anyhow::bail!("no chapter {number}");
            }
        }
        Some(TimelineCommand::Remove { number }) => match session.remove_chapter(number)? {
            Some(ch) => println!("removed chapter {number} (messages {}-{})", ch.start, ch.end),
            None => anyhow::bail!("no chapter {number}"),
        },
    }
    Ok(())
}

pub fn export_memories(session: &Session, name: Option<String>) -> anyhow::Result<()> {
    let data_dir = &session.config().storage.data_dir;
    let store = DocumentStore::open(data_dir)?;
    let name = name.unwrap_or_else(|| session.config().storage.memory_store_name.clone());

    let used = session.export_memories(&store, &name)?;
    println!(
        "exported {} memories to {}",
        session.memory().len(),
        data_dir.join(format!("{used}.json")).display()
    );
    Ok(())
}

pub fn preset(config: &Config, command: PresetCommand) -> anyhow::Result<()> {
    let store = DocumentStore::open(&config.storage.data_dir)?;
    let presets = Presets::new(store, &config.storage.preset_store_name);

    match command {
        PresetCommand::Save { name } => {
            presets.save(&name, config)?;
            println!("preset '{name}' saved");
        }
        PresetCommand::Delete { name } => {
            if presets.delete(&name)? {
                println!("preset '{name}' deleted");
            } else {
                anyhow::bail!("no preset named '{name}'");
            }
        }
        PresetCommand::List => {
            let names = presets.list()?;
            if names.is_empty() {
                println!("(no presets)");
            }
            for name in names {
                println!("{name}");
            }
        }
        PresetCommand::Export { name, path } => {
            presets.export(&name, &path)?;
            println!("preset '{name}' written to {}", path.display());
        }
        PresetCommand::Import { path } => {
            let name = presets.import(&path)?;
            println!("preset '{name}' imported");
        }
    }
    Ok(())
}
