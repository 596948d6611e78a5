use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Mutex;
use tracing::debug;

use crate::actors::messages::AppError;
use crate::actors::traits::CompletionPort;
use crate::brain::keywords::KeywordClassifier;
use crate::brain::responses::ResponseSelector;
use crate::models::{ChatMessage, Role};

/// Completion backend that answers from the built-in reply pools.
///
/// Only the last user message is looked at: its keyword topic picks the pool,
/// and anything unrecognized gets a generic reply. Never fails.
pub struct CannedResponder {
    classifier: KeywordClassifier,
    selector: ResponseSelector,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl CannedResponder {
    pub fn new() -> Self {
        Self::with_rng(Box::new(StdRng::from_entropy()))
    }

    pub fn with_rng(rng: Box<dyn RngCore + Send>) -> Self {
        Self::with_selector(ResponseSelector::new(), rng)
    }

    pub fn with_selector(selector: ResponseSelector, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            classifier: KeywordClassifier::new(),
            selector,
            rng: Mutex::new(rng),
        }
    }

    /// Reply to a single user text
    pub fn reply_to(&self, text: &str) -> String {
        let topic = self.classifier.classify(text);
        debug!("Canned reply for topic {:?}", topic);

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.selector.select(topic, rng.as_mut()).to_string()
    }
}

#[async_trait]
impl CompletionPort for CannedResponder {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, AppError> {
        let text = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(self.reply_to(text))
    }
}
