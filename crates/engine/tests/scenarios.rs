//! End-to-end scenarios over a full session with a scripted generator.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use recap_chatlog::{ChatLog, ChatMessage};
use recap_domain::config::Config;
use recap_domain::error::Result;
use recap_engine::{Session, Timeline};
use recap_memory::DocumentStore;
use recap_providers::{
    GenerateRequest, GenerateResponse, GenerationGateway, Generator, HeuristicCounter,
};

struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    async fn complete(&self, _req: &GenerateRequest) -> Result<GenerateResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| "scripted summary".into());
        Ok(GenerateResponse {
            content: reply,
            model: "mock".into(),
        })
    }

    fn backend_id(&self) -> &str {
        "mock"
    }
}

fn chat(n: usize) -> ChatLog {
    let msgs = (0..n)
        .map(|i| {
            if i % 2 == 0 {
                ChatMessage::user("Alice", &format!("something happened in part {i}"))
            } else {
                ChatMessage::character("Bot", &format!("and the story continued at {i}"))
            }
        })
        .collect();
    ChatLog::from_messages(msgs)
}

fn session(log: ChatLog, generator: Arc<ScriptedGenerator>, config: Config) -> Session {
    let gateway = Arc::new(GenerationGateway::new(generator, &config.generation));
    Session::new(log, gateway, Arc::new(HeuristicCounter), config)
}

#[tokio::test(start_paused = true)]
async fn oversized_scene_is_chunked_and_marked() {
    let generator = ScriptedGenerator::new(&[]);
    let mut config = Config::default();
    // Small budget so a ten-message scene cannot fit in one call.
    config.generation.context_limit_tokens = 500 + 60;

    let msgs = (0..10)
        .map(|i| ChatMessage::user("Alice", &format!("{i} {}", "narrative ".repeat(20))))
        .collect();
    let mut s = session(ChatLog::from_messages(msgs), generator.clone(), config);

    let summary = s.summarize_scene(0, 9).await.unwrap();
    assert!(!summary.is_empty());
    // at least two group calls plus a reduction call
    assert!(generator.calls() >= 3, "calls: {}", generator.calls());

    let end = s.log().get(9).unwrap();
    assert!(end.meta.scene_end);
    assert_eq!(end.meta.scene_start, Some(0));
    assert_eq!(s.timeline().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn autofill_covers_full_blocks_and_leaves_tail() {
    let generator = ScriptedGenerator::new(&[]);
    let mut s = session(chat(45), generator, Config::default());

    let created = s.auto_fill(20).await.unwrap();
    assert_eq!(created, 2);

    let chapters = s.timeline().chapters();
    assert_eq!((chapters[0].start, chapters[0].end), (0, 19));
    assert_eq!((chapters[1].start, chapters[1].end), (20, 39));
    for i in 40..45 {
        assert!(!s.log().get(i).unwrap().meta.has_any_summary());
    }
}

#[tokio::test(start_paused = true)]
async fn retrieval_ranks_matching_summaries_first() {
    let generator = ScriptedGenerator::new(&[
        "Alice found the silver key in the cellar.",
        "Bot described the weather on the mountain.",
    ]);
    let mut s = session(chat(4), generator, Config::default());
    s.summarize_message(0).await.unwrap();
    s.summarize_message(1).await.unwrap();

    let hits = s.retrieve(Some("where is the silver key"));
    assert!(!hits.is_empty());
    assert!(hits[0].entry.summary.contains("silver key"));
    assert!(hits[0].score > 0.0);
}

#[tokio::test(start_paused = true)]
async fn chapter_removal_renumbers_but_keeps_ranges() {
    let generator = ScriptedGenerator::new(&[]);
    let mut s = session(chat(30), generator, Config::default());
    s.summarize_scene(0, 9).await.unwrap();
    s.summarize_scene(10, 19).await.unwrap();
    s.summarize_scene(20, 29).await.unwrap();

    let removed = s.remove_chapter(2).unwrap().unwrap();
    assert_eq!((removed.start, removed.end), (10, 19));

    let chapters = s.timeline().chapters();
    assert_eq!(chapters.len(), 2);
    assert_eq!((chapters[0].start, chapters[0].end), (0, 9));
    assert_eq!((chapters[1].start, chapters[1].end), (20, 29));
    // the middle scene's metadata is gone with it
    assert!(!s.log().get(19).unwrap().meta.scene_end);
}

#[tokio::test(start_paused = true)]
async fn clear_then_rebuild_leaves_empty_caches() {
    let generator = ScriptedGenerator::new(&[]);
    let mut s = session(chat(12), generator, Config::default());
    s.summarize_message(0).await.unwrap();
    s.summarize_scene(0, 5).await.unwrap();
    assert!(s.memory().len() >= 2);

    let (touched, _unhidden) = s.clear_all_summaries().unwrap();
    assert!(touched >= 2);
    assert_eq!(s.timeline().len(), 0);
    assert_eq!(s.memory().derived_count(), 0);
    assert_eq!(Timeline::watermark(s.log()), None);

    s.rebuild_caches();
    assert_eq!(s.timeline().len(), 0);
    assert_eq!(s.memory().derived_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn summaries_survive_a_reload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.jsonl");

    {
        let mut log = ChatLog::load(&path).unwrap();
        for i in 0..6 {
            log.push(ChatMessage::user("Alice", &format!("line {i}")));
        }
        let generator = ScriptedGenerator::new(&["the opening scene"]);
        let mut s = session(log, generator, Config::default());
        s.summarize_scene(0, 3).await.unwrap();
    }

    let reloaded = ChatLog::load(&path).unwrap();
    assert_eq!(reloaded.len(), 6);
    assert_eq!(
        reloaded.get(3).unwrap().meta.scene_summary.as_deref(),
        Some("the opening scene")
    );

    let generator = ScriptedGenerator::new(&[]);
    let s = session(reloaded, generator, Config::default());
    assert_eq!(s.timeline().len(), 1);
    assert_eq!(s.memory().derived_count(), 1);
    assert_eq!(Timeline::watermark(s.log()), Some(3));
}

#[tokio::test(start_paused = true)]
async fn export_after_summaries_produces_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::open(dir.path()).unwrap();
    let generator = ScriptedGenerator::new(&["message note", "scene note"]);
    let mut s = session(chat(8), generator, Config::default());

    s.summarize_message(2).await.unwrap();
    s.summarize_scene(0, 5).await.unwrap();

    let name = s.export_memories(&store, "memories").unwrap();
    let doc: std::collections::BTreeMap<String, serde_json::Value> =
        store.load(&name).unwrap().unwrap();
    assert_eq!(doc["message-2"]["content"], "message note");
    assert_eq!(doc["scene-5"]["content"], "scene note");
    assert_eq!(doc["scene-5"]["metadata"]["kind"], "scene");
}
