use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::actors::traits::ConversationLog;
use crate::error::AppError;
use crate::models::{ChatMessage, ConversationTurn, Role};

/// Open (creating if missing) the SQLite database at `db_url` and apply the schema.
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    info!("Initializing database at: {}", db_url);

    let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    info!("Database initialized and migrations applied.");

    Ok(pool)
}

/// Create the `chat_logs` table and its lookup index if they do not exist.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_chat_logs_user ON chat_logs(user_id, id);
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Conversation log backed by the `chat_logs` table.
///
/// Rows are never updated; insertion order (the autoincrement id) is the
/// conversation order.
#[derive(Clone)]
pub struct SqliteConversationLog {
    pool: SqlitePool,
}

impl SqliteConversationLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database at `db_url` and wrap it.
    pub async fn connect(db_url: &str) -> Result<Self, AppError> {
        Ok(Self::new(init_db(db_url).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every user-authored turn of `user_id` at or after `since_ms`, oldest first.
    pub async fn user_turns_since(
        &self,
        user_id: &str,
        since_ms: i64,
    ) -> Result<Vec<ConversationTurn>, AppError> {
        let turns = sqlx::query_as::<_, ConversationTurn>(
            r#"
            SELECT id, user_id, role, message, created_at
            FROM chat_logs
            WHERE user_id = ? AND role = 'user' AND created_at >= ?
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .bind(since_ms)
        .fetch_all(&self.pool)
        .await?;
        Ok(turns)
    }

    /// Every stored turn of `user_id`, including system audit notes, oldest first.
    pub async fn all_turns(&self, user_id: &str) -> Result<Vec<ConversationTurn>, AppError> {
        let turns = sqlx::query_as::<_, ConversationTurn>(
            r#"
            SELECT id, user_id, role, message, created_at
            FROM chat_logs
            WHERE user_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(turns)
    }
}

#[async_trait]
impl ConversationLog for SqliteConversationLog {
    #[instrument(skip(self))]
    async fn read_recent_turns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let mut turns = sqlx::query_as::<_, ConversationTurn>(
            r#"
            SELECT id, user_id, role, message, created_at
            FROM chat_logs
            WHERE user_id = ? AND role IN ('user', 'assistant', 'bot')
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        turns.reverse();
        Ok(turns
            .into_iter()
            .filter_map(|turn| turn.role().map(|role| ChatMessage::new(role, turn.message)))
            .collect())
    }

    #[instrument(skip(self, text))]
    async fn append_turn(&self, user_id: &str, role: Role, text: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO chat_logs (user_id, role, message, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(text)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM chat_logs WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Conversation log kept in process memory, for setups without a database.
#[derive(Default)]
pub struct MemoryConversationLog {
    turns: RwLock<Vec<ConversationTurn>>,
}

impl MemoryConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored turn of `user_id`, including system audit notes, oldest first.
    pub async fn all_turns(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.turns
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ConversationLog for MemoryConversationLog {
    async fn read_recent_turns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let turns = self.turns.read().await;
        let mut recent: Vec<ChatMessage> = turns
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .filter_map(|t| match t.role() {
                Some(role @ (Role::User | Role::Assistant)) => Some(ChatMessage::new(role, t.message.clone())),
                _ => None,
            })
            .take(limit)
            .collect();
        recent.reverse();
        Ok(recent)
    }

    async fn append_turn(&self, user_id: &str, role: Role, text: &str) -> Result<(), AppError> {
        let mut turns = self.turns.write().await;
        let id = turns.len() as i64 + 1;
        turns.push(ConversationTurn {
            id,
            user_id: user_id.to_string(),
            role: role.as_str().to_string(),
            message: text.to_string(),
            created_at: Utc::now().timestamp_millis(),
        });
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> Result<u64, AppError> {
        let mut turns = self.turns.write().await;
        let before = turns.len();
        turns.retain(|t| t.user_id != user_id);
        Ok((before - turns.len()) as u64)
    }
}
