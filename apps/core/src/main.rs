// Kkiri terminal chat
// Reads one message per line from stdin and prints the reply.
// `/reset` forgets the conversation, `/report` prints the weekly mood data.

use chrono::Utc;
use kkiri_core::actors::canned::CannedResponder;
use kkiri_core::actors::llm::LlmActorHandle;
use kkiri_core::actors::traits::CompletionPort;
use kkiri_core::config::{self, CompletionConfig, DialogueConfig};
use kkiri_core::database::SqliteConversationLog;
use kkiri_core::report;
use kkiri_core::telemetry::{self, LogFormat};
use kkiri_core::{AppError, Supervisor};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

const USER_ID: &str = "local";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    telemetry::init_tracing("kkiri", LogFormat::from_env())?;

    let dialogue = DialogueConfig::from_env()?;
    let log = Arc::new(SqliteConversationLog::connect(&config::database_url()).await?);

    match CompletionConfig::from_env() {
        Ok(completion) => {
            info!("Using completion model {}", completion.model);
            let handle = LlmActorHandle::with_timeout(completion, dialogue.completion_timeout());
            chat_loop(Supervisor::new(Arc::new(handle), Arc::clone(&log), dialogue), &log).await
        }
        Err(e) => {
            warn!("{}; falling back to canned replies", e);
            chat_loop(Supervisor::new(Arc::new(CannedResponder::new()), Arc::clone(&log), dialogue), &log).await
        }
    }
}

async fn chat_loop<L: CompletionPort>(
    supervisor: Supervisor<L, SqliteConversationLog>,
    log: &SqliteConversationLog,
) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let reply = match line.trim() {
            "" => continue,
            "/reset" => {
                supervisor.reset(USER_ID).await?;
                "대화를 초기화했어.".to_string()
            }
            "/report" => {
                let weekly = report::load_weekly_report(log, USER_ID, Utc::now()).await?;
                serde_json::to_string_pretty(&weekly)?
            }
            text => supervisor.respond(text, USER_ID).await,
        };
        stdout.write_all(format!("끼리: {}\n", reply).as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
