//! Message intent detection using regex patterns.
//!
//! Two signals drive the dialogue before any topic classification happens:
//! an explicit request for the report view, and a short negative/evasive
//! answer that the screening engine answers with an empathetic bridge.

use regex::Regex;
use std::sync::LazyLock;

// NOTE: expect() is acceptable here, the patterns are constants covered by tests.
static REPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(리포트|보고서|감정\s*분석|결과|점수|\breports?\b|\bscores?\b|\banalysis\b)")
        .expect("Invalid regex: report request")
});

static EVASIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(없어|없었어|글쎄|모르겠|잘 몰라|그냥|아니|별로|안 해|안해|\bdunno\b|\bidk\b|not sure|\bwhatever\b|\bnah\b)")
        .expect("Invalid regex: evasive answer")
});

/// Regex-based intent classifier
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    report: &'static Regex,
    evasive: &'static Regex,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            report: &REPORT_PATTERN,
            evasive: &EVASIVE_PATTERN,
        }
    }

    pub fn is_report_request(&self, text: &str) -> bool {
        self.report.is_match(text)
    }

    pub fn is_evasive(&self, text: &str) -> bool {
        self.evasive.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_request_detection() {
        let classifier = IntentClassifier::new();

        for text in ["리포트 보여줘", "내 점수 어때?", "감정 분석 해줘", "감정분석", "show my Report"] {
            assert!(classifier.is_report_request(text), "{}", text);
        }
    }

    #[test]
    fn test_evasive_detection() {
        let classifier = IntentClassifier::new();

        for text in ["글쎄", "그냥 그래", "잘 몰라", "아니 별로", "idk"] {
            assert!(classifier.is_evasive(text), "{}", text);
            assert!(!classifier.is_report_request(text), "{}", text);
        }
    }

    #[test]
    fn test_plain_conversation() {
        let classifier = IntentClassifier::new();

        for text in ["오늘 친구랑 놀았어", ""] {
            assert!(!classifier.is_report_request(text), "{}", text);
            assert!(!classifier.is_evasive(text), "{}", text);
        }
    }
}
