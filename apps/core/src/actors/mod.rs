//! # Actors
//!
//! - `traits`: the completion and conversation-log ports
//! - `llm`: OpenAI-compatible completion actor
//! - `canned`: keyword reply backend behind the same port
//! - `supervisor`: the dialogue orchestrator

pub mod canned;
pub mod llm;
pub mod messages;
pub mod supervisor;
pub mod traits;
