//! Screening answer scoring.
//!
//! Classifies a free-text answer into an ordinal frequency level (0-3) with
//! four regex families checked in a fixed order. The first family that
//! matches wins, so "가끔 자주" scores 1, not 2. Answers that match nothing
//! score 1 ("some presence assumed").

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Score given to answers that match no family
pub const DEFAULT_SCORE: u8 = 1;

/// Highest score a single answer can get
pub const MAX_ITEM_SCORE: u8 = 3;

// NOTE: expect() is acceptable on these constant patterns; they are covered by tests.
static ABSENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(전혀|없|괜찮|안 그래|별로 아님|거의 없|드물|잘 안|\bnever\b|\bnone\b|not really|not at all|\brarely\b)")
        .expect("Invalid regex: absence family")
});

static OCCASIONAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(가끔|며칠|조금|약간|때때로|간혹|\bsometimes\b|\boccasionally\b|a few days|a little)")
        .expect("Invalid regex: occasional family")
});

static FREQUENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(자주|종종|절반|많이|꽤|종일|\boften\b|\bfrequently\b|quite a bit|most days)")
        .expect("Invalid regex: frequent family")
});

// A bare "늘" would also match "오늘", so it must stand alone.
static CONSTANT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(매일|맨날|항상|(?:^|\s)늘(?:\s|$)|매번|하루종일|계속|매 순간|\bevery ?day\b|\balways\b|\bconstantly\b|all the time)")
        .expect("Invalid regex: constant family")
});

/// Frequency family an answer was classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Absent,
    Occasional,
    Frequent,
    Constant,
}

impl Frequency {
    pub fn score(&self) -> u8 {
        match self {
            Frequency::Absent => 0,
            Frequency::Occasional => 1,
            Frequency::Frequent => 2,
            Frequency::Constant => 3,
        }
    }
}

/// Regex-family answer scorer
pub struct AnswerScorer {
    families: Vec<(Frequency, &'static Regex)>,
}

impl Default for AnswerScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerScorer {
    pub fn new() -> Self {
        Self {
            families: vec![
                (Frequency::Absent, &*ABSENCE_PATTERN),
                (Frequency::Occasional, &*OCCASIONAL_PATTERN),
                (Frequency::Frequent, &*FREQUENT_PATTERN),
                (Frequency::Constant, &*CONSTANT_PATTERN),
            ],
        }
    }

    /// The first family matching the lower-cased answer, if any
    pub fn classify(&self, answer: &str) -> Option<Frequency> {
        let text = answer.to_lowercase();
        self.families
            .iter()
            .find(|(_, pattern)| pattern.is_match(&text))
            .map(|(frequency, _)| *frequency)
    }

    /// Score an answer in `0..=3`
    pub fn score(&self, answer: &str) -> u8 {
        self.classify(answer)
            .map(|f| f.score())
            .unwrap_or(DEFAULT_SCORE)
    }
}

/// Qualitative band for a completed battery total
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    Normal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl SeverityBand {
    /// Map a cumulative score to its band (PHQ-9 cut-offs)
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=4 => SeverityBand::Normal,
            5..=9 => SeverityBand::Mild,
            10..=14 => SeverityBand::Moderate,
            15..=19 => SeverityBand::ModeratelySevere,
            _ => SeverityBand::Severe,
        }
    }

    /// Label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            SeverityBand::Normal => "정상",
            SeverityBand::Mild => "가벼운 수준",
            SeverityBand::Moderate => "중간 수준",
            SeverityBand::ModeratelySevere => "조금 심한 수준",
            SeverityBand::Severe => "심한 수준",
        }
    }
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
