//! Kkiri dialogue core.
//!
//! A Korean-language companion chat engine: canned small talk, an adaptive
//! PHQ-style screening questionnaire woven into the conversation, and an LLM
//! completion fallback for everything else. `actors::supervisor::Supervisor`
//! is the entry point.

pub mod actors;
pub mod brain;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod report;
pub mod screening;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use actors::supervisor::Supervisor;
pub use config::{CompletionConfig, DialogueConfig, LeadMode};
pub use error::AppError;
