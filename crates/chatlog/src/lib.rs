//! The host-side chat log: an ordered, index-addressed sequence of message
//! records persisted as JSONL, with a typed summary-metadata bag on each
//! record.
//!
//! The log owns record structure (create/delete/ordering); the engine only
//! mutates each record's [`SummaryMeta`].

pub mod log;
pub mod message;

pub use log::ChatLog;
pub use message::{ChatMessage, SummaryMeta};
