use async_trait::async_trait;

use crate::actors::messages::AppError;
use crate::models::{ChatMessage, Role};

/// Anything that can turn an ordered chat context into one assistant reply.
///
/// The orchestrator only talks to this trait, so the HTTP actor, the canned
/// keyword responder and test doubles are interchangeable.
#[async_trait]
pub trait CompletionPort: Send + Sync + 'static {
    /// `messages` is ordered oldest first; the last entry is the current user turn.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, AppError>;
}

/// Append-only per-user conversation history.
#[async_trait]
pub trait ConversationLog: Send + Sync + 'static {
    /// The last `limit` user/assistant turns of `user_id`, oldest first.
    ///
    /// System audit notes are never part of the result.
    async fn read_recent_turns(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>, AppError>;

    async fn append_turn(&self, user_id: &str, role: Role, text: &str) -> Result<(), AppError>;

    /// Delete every turn of `user_id`, returning how many were removed.
    async fn clear(&self, user_id: &str) -> Result<u64, AppError>;
}
