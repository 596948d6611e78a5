use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::battery::{ScreeningTopic, BATTERY};

/// How many recently asked topics are remembered
pub const ASKED_WINDOW: usize = 6;

/// Bounded, ordered set of the most recently asked topics.
///
/// Pushing past the capacity evicts the oldest entry, so a topic can be asked
/// again once it has fallen out of the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredAskedTopics")]
pub struct AskedTopics {
    capacity: usize,
    topics: VecDeque<ScreeningTopic>,
}

#[derive(Deserialize)]
struct StoredAskedTopics {
    capacity: usize,
    topics: VecDeque<ScreeningTopic>,
}

// Stored values go through the same clamp as `with_capacity`, keeping only
// the most recent topics when there are more than fit.
impl From<StoredAskedTopics> for AskedTopics {
    fn from(stored: StoredAskedTopics) -> Self {
        let mut asked = Self::with_capacity(stored.capacity);
        for topic in stored.topics {
            asked.push(topic);
        }
        asked
    }
}

impl Default for AskedTopics {
    fn default() -> Self {
        Self::with_capacity(ASKED_WINDOW)
    }
}

impl AskedTopics {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: VecDeque::new(),
        }
    }

    pub fn push(&mut self, topic: ScreeningTopic) {
        while self.topics.len() >= self.capacity {
            self.topics.pop_front();
        }
        self.topics.push_back(topic);
    }

    pub fn contains(&self, topic: ScreeningTopic) -> bool {
        self.topics.contains(&topic)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn clear(&mut self) {
        self.topics.clear();
    }
}

/// Per-user screening progress.
///
/// Only the screening engine mutates this; `next_index` and `cumulative_score`
/// never decrease except when a finished cycle is reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningState {
    /// Cursor into the battery: everything before it was asked or skipped
    pub next_index: usize,
    /// Sum of the scored answers of the current cycle
    pub cumulative_score: u32,
    pub asked_topics: AskedTopics,
    /// Turns left during which no question is proactively asked
    pub cooldown_turns: u32,
    /// Whether the one-time report nudge was sent this cycle
    pub completion_notified: bool,
    /// Battery item asked on the previous bot turn, awaiting its answer
    pub pending_item: Option<usize>,
    /// Bit `i` is set once battery item `i` was asked this cycle
    #[serde(default)]
    pub asked_items: u16,
}

impl ScreeningState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn was_asked(&self, index: usize) -> bool {
        index < BATTERY.len() && self.asked_items & (1 << index) != 0
    }

    /// Record item `index` as asked and move the cursor past every item
    /// already asked this cycle.
    pub fn mark_asked(&mut self, index: usize) {
        if index < BATTERY.len() {
            self.asked_items |= 1 << index;
        }
        while self.next_index < BATTERY.len() && self.was_asked(self.next_index) {
            self.next_index += 1;
        }
    }

    /// Every item has been passed by the cursor
    pub fn is_exhausted(&self) -> bool {
        self.next_index >= BATTERY.len()
    }

    /// Start a new cycle after a summary
    pub fn reset_cycle(&mut self) {
        self.next_index = 0;
        self.cumulative_score = 0;
        self.asked_topics.clear();
        self.completion_notified = false;
        self.pending_item = None;
        self.asked_items = 0;
    }
}
