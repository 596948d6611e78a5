//! # Screening Module
//!
//! Opportunistic, adaptive administration of a 9-item PHQ-style battery.
//!
//! - `battery`: the items, cue words and phrase pools
//! - `state`: per-user progress
//! - `engine`: the questioning policy
//! - `store`: per-user state map with per-key locking

pub mod battery;
pub mod engine;
pub mod state;
pub mod store;

pub use battery::{ScreeningItem, ScreeningTopic, BATTERY};
pub use engine::{ScoredAnswer, ScreeningEngine, ScreeningOutcome, ScreeningSettings, ScreeningStep};
pub use state::{AskedTopics, ScreeningState};
pub use store::ScreeningStore;
