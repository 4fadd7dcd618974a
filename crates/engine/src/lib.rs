//! `recap-engine` — the summarization core.
//!
//! Chunking for oversized content, the session-scoped orchestrator that
//! decides when/what/how much to summarize, the chapter timeline, token
//! accounting, the trigger state machine fed by host lifecycle events, and
//! named settings presets.

pub mod accounting;
pub mod chunker;
pub mod events;
pub mod presets;
pub mod session;
pub mod timeline;

pub use accounting::ContextFigures;
pub use events::{TriggerAction, TriggerEvent, TriggerRouter};
pub use presets::{Preset, PresetBook, Presets};
pub use session::{Session, SessionStatus};
pub use timeline::{Chapter, Timeline};
