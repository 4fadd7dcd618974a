//! `recap-memory` — the in-process summary cache, the lexical retrieval
//! heuristic over it, and the named document store summaries export to.
//!
//! The cache is not authoritative: message and scene entries are derivable
//! from chat-log metadata at any time (and rebuilt on chat change). Custom
//! entries arrive out-of-band and are retained verbatim across rebuilds.

pub mod docstore;
pub mod retrieval;
pub mod store;
pub mod types;

pub use docstore::DocumentStore;
pub use retrieval::{retrieve, ScoredMemory};
pub use store::MemoryStore;
pub use types::{MemoryEntry, MemoryKind};
