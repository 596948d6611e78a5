//! # Brain Module
//!
//! Fast, non-LLM analysis of user messages.
//! Runs BEFORE the screening engine and the completion fallback.
//!
//! ## Components
//! - `intent`: report-request and evasive-answer detection (regex)
//! - `keywords`: small-talk / emotion topic classification (substring tables)
//! - `responses`: canned reply pools per topic
//! - `scoring`: screening answer scoring and severity bands

pub mod intent;
pub mod keywords;
pub mod responses;
pub mod scoring;

pub use intent::IntentClassifier;
pub use keywords::{KeywordClassifier, Topic};
pub use responses::ResponseSelector;
pub use scoring::{AnswerScorer, Frequency, SeverityBand};
