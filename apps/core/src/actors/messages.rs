use serde::Serialize;
use tokio::sync::oneshot;

use crate::models::ChatMessage;

/// Defines errors that can occur within the actor system.
#[derive(Debug, thiserror::Error, Serialize, Clone)]
pub enum ActorError {
    /// The completion backend rejected or failed the request.
    #[error("LLM request failed: {0}")]
    LlmError(String),
    /// The actor's mailbox or reply channel is gone.
    #[error("Internal system error: {0}")]
    Internal(String),
    /// An error indicating that an actor operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<tokio::time::error::Elapsed> for ActorError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ActorError::Timeout(format!("Actor operation timed out: {}", err))
    }
}

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to the completion actor.
#[derive(Debug)]
pub enum LlmMessage {
    /// Produce one assistant reply for an ordered chat context.
    Complete {
        messages: Vec<ChatMessage>,
        /// A channel to send the reply text back.
        responder: oneshot::Sender<Result<String, AppError>>,
    },
}
