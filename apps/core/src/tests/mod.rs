//! Test Module
//!
//! Cross-module suites for the dialogue core.
//!
//! ## Test Categories
//! - `brain_tests`: scorer tiers, classifier priority, reply selection
//! - `database_tests`: SQLite conversation log and weekly report loading
//! - `supervisor_tests`: orchestration under concurrency, full screening cycles
//! - `integration_tests`: SQLite log + canned backend end to end
