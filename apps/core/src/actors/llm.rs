use crate::actors::messages::{ActorError, AppError, LlmMessage};
use crate::actors::traits::CompletionPort;
use crate::config::CompletionConfig;
use crate::models::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};

// --- Constants ---
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Slack on top of the HTTP timeout before the handle gives up on the actor
const REPLY_GRACE: Duration = Duration::from_secs(1);

/// A handle to the completion actor.
///
/// Cloneable, and the only way to reach the running `LlmActorRunner`.
#[derive(Clone)]
pub struct LlmActorHandle {
    sender: mpsc::Sender<LlmMessage>,
    request_timeout: Duration,
}

impl LlmActorHandle {
    /// Spawns the actor with the default request timeout.
    pub fn new(config: CompletionConfig) -> Self {
        Self::with_timeout(config, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Spawns the actor; each HTTP request is bounded by `request_timeout`.
    pub fn with_timeout(config: CompletionConfig, request_timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let actor = LlmActorRunner::new(receiver, config, request_timeout);
        tokio::spawn(async move { actor.run().await });
        Self {
            sender,
            request_timeout,
        }
    }
}

#[async_trait]
impl CompletionPort for LlmActorHandle {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = LlmMessage::Complete {
            messages,
            responder: send,
        };

        self.sender
            .send(msg)
            .await
            .map_err(|e| ActorError::Internal(e.to_string()))?;
        timeout(self.request_timeout + REPLY_GRACE, recv)
            .await?
            .map_err(|e| ActorError::Internal(e.to_string()))?
    }
}

// --- Wire format ---
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

// --- Actor Runner (Internal Logic) ---
struct LlmActorRunner {
    receiver: mpsc::Receiver<LlmMessage>,
    config: CompletionConfig,
    client: Client,
}

impl LlmActorRunner {
    fn new(
        receiver: mpsc::Receiver<LlmMessage>,
        config: CompletionConfig,
        request_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client, using defaults: {}", e);
                Client::new()
            });

        Self {
            receiver,
            config,
            client,
        }
    }

    async fn run(mut self) {
        info!("LlmActor started (model: {})", self.config.model);

        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg).await;
        }

        info!("LlmActor stopped");
    }

    async fn handle_message(&mut self, msg: LlmMessage) {
        match msg {
            LlmMessage::Complete {
                messages,
                responder,
            } => {
                let result = self.chat_completion(&messages).await;
                if let Err(e) = &result {
                    error!("Completion failed: {}", e);
                }
                let _ = responder.send(result);
            }
        }
    }

    #[instrument(skip(self, messages), fields(turns = messages.len()))]
    async fn chat_completion(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        let payload = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };

        let res = self
            .client
            .post(self.config.endpoint()?)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ActorError::LlmError(format!(
                "Completion request failed with status {}: {}",
                status, body
            ))
            .into());
        }

        let body: ChatCompletionResponse = res.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Completion("response contained no message content".to_string()))?;

        debug!("Completion returned {} chars", content.len());
        Ok(content.trim().to_string())
    }
}
