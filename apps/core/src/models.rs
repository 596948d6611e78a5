use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person chatting.
    User,
    /// Replies produced by the dialogue core (canned, screening or LLM).
    Assistant,
    /// Instructions for the completion model and screening audit notes.
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            // Older logs stored replies under "bot".
            "assistant" | "bot" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(AppError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// A single message as exchanged with the completion port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A persisted conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConversationTurn {
    /// Autoincrement row id, also the insertion order.
    pub id: i64,
    /// Opaque identifier of the chatting user.
    pub user_id: String,
    /// Stored role name (`user`, `assistant`, `system`).
    pub role: String,
    /// The text of the turn.
    pub message: String,
    /// Unix timestamp in milliseconds (UTC).
    pub created_at: i64,
}

impl ConversationTurn {
    /// Parsed role, if the stored value is known.
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}
