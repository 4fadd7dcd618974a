//! Generation backends for Recap.
//!
//! Defines the [`Generator`] trait every text-generation adapter implements,
//! the production [`OpenAiCompatClient`] adapter, the rate-limited
//! [`GenerationGateway`] all summarization calls go through, and the
//! [`TokenCounter`] seam for token accounting.

pub mod gateway;
pub mod openai_compat;
pub mod tokens;
pub mod traits;
mod util;

pub use gateway::GenerationGateway;
pub use openai_compat::OpenAiCompatClient;
pub use tokens::{HeuristicCounter, TokenCounter};
pub use traits::{ChatTurn, GenerateRequest, GenerateResponse, Generator, Role};
