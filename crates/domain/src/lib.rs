//! Shared types for the Recap workspace: the common error enum, the
//! settings aggregate, and structured trace events.

pub mod config;
pub mod error;
pub mod trace;
