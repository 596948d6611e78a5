//! Screening Engine - decides, per user message, whether to surface the next
//! screening question, defer, nudge toward the report, or close the cycle.
//!
//! Policy for one message, evaluated top to bottom:
//! 1. score the message if the previous bot turn asked a battery item
//! 2. battery exhausted (and nothing scored this turn) -> summary + reset
//! 3. cooldown running -> decrement, no action
//! 4. evasive answer -> bridge phrase + next unasked item
//! 5. nothing asked yet this cycle -> lead prompt with the configured chance
//! 6. cue word present -> the item the cue points at, else the next unasked one
//! 7. cursor past the nudge threshold -> one-time report nudge

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::battery::{
    index_of, ScreeningItem, ScreeningTopic, BATTERY, BRIDGE_PHRASES, CUES, LEAD_PROMPTS,
    NUDGE_MESSAGE,
};
use super::state::ScreeningState;
use crate::brain::intent::IntentClassifier;
use crate::brain::scoring::{AnswerScorer, SeverityBand};
use crate::config::{DialogueConfig, LeadMode};

/// Tunables of the questioning policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreeningSettings {
    /// Probability of opening with a lead prompt when nothing was asked yet
    pub lead_chance: f64,
    /// Cursor position from which the report nudge is sent
    pub nudge_threshold: usize,
    /// Silent turns after a battery question
    pub question_cooldown: u32,
    /// Silent turns after a lead prompt
    pub lead_cooldown: u32,
}

impl Default for ScreeningSettings {
    fn default() -> Self {
        Self {
            lead_chance: LeadMode::Normal.chance(),
            nudge_threshold: 6,
            question_cooldown: 2,
            lead_cooldown: 1,
        }
    }
}

impl From<&DialogueConfig> for ScreeningSettings {
    fn from(config: &DialogueConfig) -> Self {
        Self {
            lead_chance: config.lead_mode.chance(),
            nudge_threshold: config.nudge_threshold,
            question_cooldown: config.question_cooldown,
            lead_cooldown: config.lead_cooldown,
        }
    }
}

/// What the engine wants to say this turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreeningOutcome {
    NoAction,
    Question { topic: ScreeningTopic, text: String },
    Lead { text: String },
    Nudge { text: String },
    Summary { score: u32, band: SeverityBand },
}

impl ScreeningOutcome {
    /// The reply text, if the engine produced one
    pub fn message(&self) -> Option<String> {
        match self {
            ScreeningOutcome::NoAction => None,
            ScreeningOutcome::Question { text, .. }
            | ScreeningOutcome::Lead { text }
            | ScreeningOutcome::Nudge { text } => Some(text.clone()),
            ScreeningOutcome::Summary { score, band } => Some(format!(
                "간단 체크는 여기까지! (총점: {}점, {}) 상단 ‘리포트’에서 자세히 볼 수 있어.",
                score, band
            )),
        }
    }
}

/// An answer scored against a pending battery item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    pub item_index: usize,
    pub topic: ScreeningTopic,
    pub prompt: String,
    pub score: u8,
}

impl ScoredAnswer {
    /// Audit line stored as a system turn
    pub fn audit_note(&self) -> String {
        format!("[PHQ] {} → {}점", self.prompt, self.score)
    }
}

/// Result of feeding one message to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningStep {
    pub answered: Option<ScoredAnswer>,
    pub outcome: ScreeningOutcome,
}

pub struct ScreeningEngine {
    scorer: AnswerScorer,
    intents: IntentClassifier,
    settings: ScreeningSettings,
}

impl Default for ScreeningEngine {
    fn default() -> Self {
        Self::new(ScreeningSettings::default())
    }
}

impl ScreeningEngine {
    pub fn new(settings: ScreeningSettings) -> Self {
        Self {
            scorer: AnswerScorer::new(),
            intents: IntentClassifier::new(),
            settings,
        }
    }

    /// Feed one user message: score a pending answer, then decide what to say.
    pub fn step(
        &self,
        state: &mut ScreeningState,
        text: &str,
        rng: &mut dyn RngCore,
    ) -> ScreeningStep {
        let answered = self.record_answer(state, text);
        let outcome = self.decide(state, text, answered.is_some(), rng);
        debug!(
            next_index = state.next_index,
            cumulative_score = state.cumulative_score,
            cooldown = state.cooldown_turns,
            ?outcome,
            "screening step"
        );
        ScreeningStep { answered, outcome }
    }

    fn record_answer(&self, state: &mut ScreeningState, text: &str) -> Option<ScoredAnswer> {
        let item_index = state.pending_item.take()?;
        let item = BATTERY.get(item_index)?;
        let score = self.scorer.score(text);
        state.cumulative_score += u32::from(score);

        Some(ScoredAnswer {
            item_index,
            topic: item.topic,
            prompt: item.prompt.to_string(),
            score,
        })
    }

    fn decide(
        &self,
        state: &mut ScreeningState,
        text: &str,
        just_answered: bool,
        rng: &mut dyn RngCore,
    ) -> ScreeningOutcome {
        if state.is_exhausted() && state.pending_item.is_none() && !just_answered {
            let score = state.cumulative_score;
            state.reset_cycle();
            return ScreeningOutcome::Summary {
                score,
                band: SeverityBand::from_score(score),
            };
        }

        if state.cooldown_turns > 0 {
            state.cooldown_turns -= 1;
            return ScreeningOutcome::NoAction;
        }

        if self.intents.is_evasive(text) {
            let bridge = pick(BRIDGE_PHRASES, rng);
            return match self.ask_next_unasked(state) {
                Some(item) => ScreeningOutcome::Question {
                    topic: item.topic,
                    text: format!("{}\n{}", bridge, item.prompt),
                },
                None => ScreeningOutcome::Lead {
                    text: format!("{}\n{}", bridge, pick(LEAD_PROMPTS, rng)),
                },
            };
        }

        if state.asked_topics.is_empty() && rng.gen::<f64>() < self.settings.lead_chance {
            state.cooldown_turns = self.settings.lead_cooldown;
            return ScreeningOutcome::Lead {
                text: pick(LEAD_PROMPTS, rng).to_string(),
            };
        }

        if CUES.iter().any(|(cue, _)| text.contains(cue)) {
            if let Some(item) = self.ask_for_cue(state, text) {
                return ScreeningOutcome::Question {
                    topic: item.topic,
                    text: item.prompt.to_string(),
                };
            }
        }

        if state.next_index >= self.settings.nudge_threshold && !state.completion_notified {
            state.completion_notified = true;
            return ScreeningOutcome::Nudge {
                text: NUDGE_MESSAGE.to_string(),
            };
        }

        ScreeningOutcome::NoAction
    }

    /// Scan forward from the cursor for an item not asked this cycle whose
    /// topic is outside the asked window.
    ///
    /// When every such item is in the window the first one not asked this
    /// cycle is reused. `None` once every remaining item was asked.
    fn ask_next_unasked(&self, state: &mut ScreeningState) -> Option<&'static ScreeningItem> {
        let start = state.next_index;
        let fresh = (start..BATTERY.len()).filter(|&j| !state.was_asked(j));

        let index = fresh
            .clone()
            .find(|&j| !state.asked_topics.contains(BATTERY[j].topic))
            .or_else(|| fresh.clone().next());

        match index {
            Some(index) => {
                state.next_index = index + 1;
                Some(self.ask_item(state, index))
            }
            None => {
                state.next_index = state.next_index.max(BATTERY.len());
                None
            }
        }
    }

    /// Ask the earliest item named by a cue in `text` that is still ahead of
    /// the cursor and not asked this cycle; otherwise the next unasked item.
    fn ask_for_cue(&self, state: &mut ScreeningState, text: &str) -> Option<&'static ScreeningItem> {
        let targeted = CUES
            .iter()
            .filter(|(cue, _)| text.contains(cue))
            .filter_map(|(_, topic)| topic.and_then(index_of))
            .filter(|&j| j >= state.next_index && !state.was_asked(j))
            .min();

        match targeted {
            Some(index) => Some(self.ask_item(state, index)),
            None => self.ask_next_unasked(state),
        }
    }

    fn ask_item(&self, state: &mut ScreeningState, index: usize) -> &'static ScreeningItem {
        let item = &BATTERY[index];
        state.cooldown_turns = self.settings.question_cooldown;
        state.asked_topics.push(item.topic);
        state.pending_item = Some(index);
        state.mark_asked(index);
        item
    }
}

fn pick(pool: &[&'static str], rng: &mut dyn RngCore) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}
