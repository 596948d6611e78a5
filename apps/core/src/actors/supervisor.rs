use crate::actors::messages::AppError;
use crate::actors::traits::{CompletionPort, ConversationLog};
use crate::brain::intent::IntentClassifier;
use crate::config::DialogueConfig;
use crate::models::{ChatMessage, Role};
use crate::screening::{ScreeningEngine, ScreeningSettings, ScreeningStep, ScreeningStore};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Arc, Mutex};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// Reply to any request for the report or a score
pub const REPORT_REDIRECT: &str =
    "지금까지 대화를 바탕으로 리포트를 만들었어. 상단 ‘리포트’를 눌러 확인해봐!";

/// System instruction sent ahead of every completion request
pub const PERSONA_PROMPT: &str = "너는 '끼리'라는 이름의 다정한 친구야. 말은 짧고 자연스럽게, 이모지는 가볍게. \
항상 공감 한마디 + 한 번에 질문 1개만. 중복 주제 반복 금지. \
리포트 요청엔 길게 설명하지 말고 바로 리포트 안내. 하지만 주어진 질문을 최대한 끝내도록 유도. \
사용자는 너를 친구로 생각하고 있음. 경어를 절대 사용하지 말 것.";

/// The reply used when the completion port fails or times out
pub fn completion_error_reply(err: &AppError) -> String {
    format!("⚠️ AI 응답 오류: {}", err)
}

/// The dialogue orchestrator.
///
/// Decides per incoming message whether to redirect to the report, let the
/// screening engine speak, or fall back to the completion port, and keeps the
/// conversation log in step. Cheap to clone; clones share all state.
pub struct Supervisor<L, C>
where
    L: CompletionPort,
    C: ConversationLog,
{
    completion: Arc<L>,
    log: Arc<C>,
    engine: Arc<ScreeningEngine>,
    intents: IntentClassifier,
    store: ScreeningStore,
    config: DialogueConfig,
    rng: Arc<Mutex<Box<dyn RngCore + Send>>>,
}

impl<L, C> Clone for Supervisor<L, C>
where
    L: CompletionPort,
    C: ConversationLog,
{
    fn clone(&self) -> Self {
        Self {
            completion: Arc::clone(&self.completion),
            log: Arc::clone(&self.log),
            engine: Arc::clone(&self.engine),
            intents: self.intents.clone(),
            store: self.store.clone(),
            config: self.config.clone(),
            rng: Arc::clone(&self.rng),
        }
    }
}

impl<L, C> Supervisor<L, C>
where
    L: CompletionPort,
    C: ConversationLog,
{
    pub fn new(completion: Arc<L>, log: Arc<C>, config: DialogueConfig) -> Self {
        Self::with_rng(completion, log, config, Box::new(StdRng::from_entropy()))
    }

    /// Same as `new`, with an explicit random source for lead chances and
    /// phrase picks.
    pub fn with_rng(
        completion: Arc<L>,
        log: Arc<C>,
        config: DialogueConfig,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        info!(lead_mode = %config.lead_mode, "Supervisor created");
        Self {
            completion,
            log,
            engine: Arc::new(ScreeningEngine::new(ScreeningSettings::from(&config))),
            intents: IntentClassifier::new(),
            store: ScreeningStore::new(),
            config,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// Per-user screening states
    pub fn store(&self) -> &ScreeningStore {
        &self.store
    }

    /// Produce the reply to one user message. Never fails.
    #[instrument(skip(self, user_text))]
    pub async fn respond(&self, user_text: &str, user_id: &str) -> String {
        let text = user_text.trim();

        if self.intents.is_report_request(text) {
            info!("Report request, redirecting");
            return REPORT_REDIRECT.to_string();
        }

        let step = self.screen(user_id, text).await;

        if let Some(answer) = &step.answered {
            debug!(topic = %answer.topic, score = answer.score, "Screening answer scored");
            self.append(user_id, Role::System, &answer.audit_note()).await;
        }

        let reply = match step.outcome.message() {
            Some(message) => message,
            None => self.complete_with_history(user_id, text).await,
        };

        self.append(user_id, Role::User, text).await;
        self.append(user_id, Role::Assistant, &reply).await;
        reply
    }

    /// Forget the user's screening progress and conversation log.
    #[instrument(skip(self))]
    pub async fn reset(&self, user_id: &str) -> Result<u64, AppError> {
        self.store.remove(user_id).await;
        let removed = self.log.clear(user_id).await?;
        info!(removed, "Conversation reset");
        Ok(removed)
    }

    /// Run the screening engine with the user's state locked.
    async fn screen(&self, user_id: &str, text: &str) -> ScreeningStep {
        let handle = self.store.entry(user_id).await;
        let mut state = handle.lock().await;
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.engine.step(&mut state, text, rng.as_mut())
    }

    async fn complete_with_history(&self, user_id: &str, text: &str) -> String {
        let history = match self
            .log
            .read_recent_turns(user_id, self.config.history_limit)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!("Could not load history, continuing without it: {}", e);
                Vec::new()
            }
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(PERSONA_PROMPT));
        messages.extend(history);
        messages.push(ChatMessage::user(text));

        let result = match timeout(self.config.completion_timeout(), self.completion.complete(messages)).await {
            Ok(result) => result,
            Err(elapsed) => Err(AppError::from(elapsed)),
        };

        match result {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                error!("Completion failed: {}", e);
                completion_error_reply(&e)
            }
        }
    }

    async fn append(&self, user_id: &str, role: Role, text: &str) {
        if let Err(e) = self.log.append_turn(user_id, role, text).await {
            error!(%role, "Failed to write conversation log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryConversationLog;
    use crate::screening::battery::{ScreeningTopic, BATTERY};
    use async_trait::async_trait;
    use rand::rngs::mock::StepRng;
    use std::time::Duration;

    // --- Mock Components ---

    struct MockCompletion {
        response: Result<String, AppError>,
        delay: Option<Duration>,
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl MockCompletion {
        fn new(response: Result<String, AppError>) -> Self {
            Self {
                response,
                delay: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new(Ok("too late".to_string()))
            }
        }

        fn calls(&self) -> Vec<Vec<ChatMessage>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionPort for MockCompletion {
        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, AppError> {
            self.calls.lock().unwrap().push(messages);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.response.clone()
        }
    }

    struct FailingLog;

    #[async_trait]
    impl ConversationLog for FailingLog {
        async fn read_recent_turns(&self, _user_id: &str, _limit: usize) -> Result<Vec<ChatMessage>, AppError> {
            Err(AppError::Internal("log offline".to_string()))
        }
        async fn append_turn(&self, _user_id: &str, _role: Role, _text: &str) -> Result<(), AppError> {
            Err(AppError::Internal("log offline".to_string()))
        }
        async fn clear(&self, _user_id: &str) -> Result<u64, AppError> {
            Err(AppError::Internal("log offline".to_string()))
        }
    }

    // --- Test Setup ---

    /// Never fires the lead chance; phrase pools yield their first entry
    fn quiet_rng() -> Box<dyn RngCore + Send> {
        Box::new(StepRng::new(0xF000_0000_0000_0000, 0))
    }

    fn setup(
        completion: MockCompletion,
    ) -> (
        Supervisor<MockCompletion, MemoryConversationLog>,
        Arc<MockCompletion>,
        Arc<MemoryConversationLog>,
    ) {
        let completion = Arc::new(completion);
        let log = Arc::new(MemoryConversationLog::new());
        let supervisor = Supervisor::with_rng(
            Arc::clone(&completion),
            Arc::clone(&log),
            DialogueConfig::default(),
            quiet_rng(),
        );
        (supervisor, completion, log)
    }

    fn roles_and_messages(turns: &[crate::models::ConversationTurn]) -> Vec<(String, String)> {
        turns.iter().map(|t| (t.role.clone(), t.message.clone())).collect()
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_report_request_is_redirected_without_side_effects() {
        // 1. Arrange
        let (supervisor, completion, log) = setup(MockCompletion::new(Ok("unused".to_string())));

        // 2. Act
        let reply = supervisor.respond("  내 리포트 보여줘 ", "u1").await;
        let reply_en = supervisor.respond("show me my SCORE", "u1").await;

        // 3. Assert
        assert_eq!(reply, REPORT_REDIRECT);
        assert_eq!(reply_en, REPORT_REDIRECT);
        assert!(log.all_turns("u1").await.is_empty());
        assert!(completion.calls().is_empty());
        assert!(supervisor.store().snapshot("u1").await.is_none());
    }

    #[tokio::test]
    async fn test_completion_reply_is_logged_with_user_turn() {
        // 1. Arrange
        let (supervisor, completion, log) = setup(MockCompletion::new(Ok("  응, 반가워!  ".to_string())));

        // 2. Act
        let reply = supervisor.respond("안녕 반가워", "u1").await;

        // 3. Assert
        assert_eq!(reply, "응, 반가워!");
        assert_eq!(
            roles_and_messages(&log.all_turns("u1").await),
            vec![
                ("user".to_string(), "안녕 반가워".to_string()),
                ("assistant".to_string(), "응, 반가워!".to_string()),
            ]
        );

        let calls = completion.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].first(), Some(&ChatMessage::system(PERSONA_PROMPT)));
        assert_eq!(calls[0].last(), Some(&ChatMessage::user("안녕 반가워")));
    }

    #[tokio::test]
    async fn test_completion_error_is_embedded_and_logged() {
        // 1. Arrange
        let (supervisor, _completion, log) =
            setup(MockCompletion::new(Err(AppError::Timeout("timeout".to_string()))));

        // 2. Act
        let reply = supervisor.respond("오늘 날씨 좋다", "u1").await;

        // 3. Assert
        assert!(reply.starts_with("⚠️ AI 응답 오류: "));
        assert!(reply.contains("timeout"));

        let turns = log.all_turns("u1").await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].role, "assistant");
        assert_eq!(turns[1].message, reply);
    }

    #[tokio::test]
    async fn test_slow_completion_hits_timeout() {
        // 1. Arrange
        let completion = Arc::new(MockCompletion::slow(Duration::from_secs(5)));
        let log = Arc::new(MemoryConversationLog::new());
        let config = DialogueConfig {
            completion_timeout_secs: 1,
            ..DialogueConfig::default()
        };
        let supervisor = Supervisor::with_rng(completion, Arc::clone(&log), config, quiet_rng());

        // 2. Act
        let reply = supervisor.respond("오늘 뭐 했게?", "u1").await;

        // 3. Assert
        assert!(reply.starts_with("⚠️ AI 응답 오류: "), "got {}", reply);
        assert_eq!(log.all_turns("u1").await.len(), 2);
    }

    #[tokio::test]
    async fn test_cue_message_gets_a_screening_question() {
        // 1. Arrange
        let (supervisor, completion, log) = setup(MockCompletion::new(Ok("unused".to_string())));

        // 2. Act
        let reply = supervisor.respond("나 요즘 계속 피곤하고 잠도 못 자", "u1").await;

        // 3. Assert
        let asked = BATTERY
            .iter()
            .find(|item| item.prompt == reply)
            .expect("reply should be a battery item");
        assert!(matches!(asked.topic, ScreeningTopic::Sleep | ScreeningTopic::Fatigue));
        assert!(completion.calls().is_empty());
        assert_eq!(log.all_turns("u1").await.len(), 2);
    }

    #[tokio::test]
    async fn test_answer_is_scored_and_audited_but_hidden_from_history() {
        // 1. Arrange
        let (supervisor, completion, log) = setup(MockCompletion::new(Ok("그랬구나".to_string())));
        let question = supervisor.respond("나 요즘 계속 피곤하고 잠도 못 자", "u1").await;

        // 2. Act
        supervisor.respond("거의 매일 그래", "u1").await;

        // 3. Assert
        let state = supervisor.store().snapshot("u1").await.unwrap();
        assert_eq!(state.cumulative_score, 3);

        let turns = log.all_turns("u1").await;
        let note = turns.iter().find(|t| t.role == "system").expect("audit note");
        assert_eq!(note.message, format!("[PHQ] {} → 3점", question));

        let history = &completion.calls()[0];
        assert!(history.iter().all(|m| m.role != Role::System || m.content == PERSONA_PROMPT));
        assert_eq!(history.len(), 4);
    }

    #[tokio::test]
    async fn test_report_request_does_not_advance_screening() {
        let (supervisor, _completion, _log) = setup(MockCompletion::new(Ok("응".to_string())));
        supervisor.respond("요즘 의욕이 없어", "u1").await;
        let before = supervisor.store().snapshot("u1").await.unwrap();

        supervisor.respond("결과 알려줘", "u1").await;

        assert_eq!(supervisor.store().snapshot("u1").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_log_failures_do_not_change_the_reply() {
        let completion = Arc::new(MockCompletion::new(Ok("괜찮아".to_string())));
        let supervisor = Supervisor::with_rng(
            completion,
            Arc::new(FailingLog),
            DialogueConfig::default(),
            quiet_rng(),
        );

        assert_eq!(supervisor.respond("오늘 뭐 먹지", "u1").await, "괜찮아");
    }

    #[tokio::test]
    async fn test_reset_clears_state_and_log() {
        let (supervisor, _completion, log) = setup(MockCompletion::new(Ok("응".to_string())));
        supervisor.respond("잠을 잘 못 자", "u1").await;
        supervisor.respond("안녕", "u2").await;

        let removed = supervisor.reset("u1").await.unwrap();

        assert_eq!(removed, 2);
        assert!(supervisor.store().snapshot("u1").await.is_none());
        assert!(log.all_turns("u1").await.is_empty());
        assert_eq!(log.all_turns("u2").await.len(), 2);
    }
}
