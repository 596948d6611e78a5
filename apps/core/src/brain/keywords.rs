//! Keyword topic classification.
//!
//! Maps free text to a small-talk or emotion topic with an ordered substring
//! scan over curated keyword lists. Emotion rows come first in the table, so a
//! message that mentions both "우울" and "밥" is classified as `Sad`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Topic bucket for a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    // Emotion / mental-health topics
    Sad,
    Anxious,
    Tired,
    Angry,
    Lonely,
    // Small talk
    Greeting,
    Thanks,
    Food,
    Weather,
    Hobby,
    Study,
    Farewell,
}

impl Topic {
    /// Every topic, in classification priority order.
    pub const ALL: [Topic; 12] = [
        Topic::Sad,
        Topic::Anxious,
        Topic::Tired,
        Topic::Angry,
        Topic::Lonely,
        Topic::Greeting,
        Topic::Thanks,
        Topic::Food,
        Topic::Weather,
        Topic::Hobby,
        Topic::Study,
        Topic::Farewell,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Topic::Sad => "sad",
            Topic::Anxious => "anxious",
            Topic::Tired => "tired",
            Topic::Angry => "angry",
            Topic::Lonely => "lonely",
            Topic::Greeting => "greeting",
            Topic::Thanks => "thanks",
            Topic::Food => "food",
            Topic::Weather => "weather",
            Topic::Hobby => "hobby",
            Topic::Study => "study",
            Topic::Farewell => "farewell",
        }
    }

    /// Whether this topic belongs to the emotion group checked first.
    pub fn is_emotional(&self) -> bool {
        matches!(
            self,
            Topic::Sad | Topic::Anxious | Topic::Tired | Topic::Angry | Topic::Lonely
        )
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// (topic, trigger substrings), in priority order
const TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
    (Topic::Sad, &["우울", "슬퍼", "슬프", "눈물", "울고", "속상", "sad", "depressed"]),
    (Topic::Anxious, &["불안", "걱정", "초조", "긴장", "무서", "anxious", "worried"]),
    (Topic::Tired, &["피곤", "지쳐", "지친", "힘들", "무기력", "졸려", "tired", "exhausted"]),
    (Topic::Angry, &["짜증", "화나", "화가", "열받", "빡쳐", "angry", "annoyed"]),
    (Topic::Lonely, &["외로", "혼자", "쓸쓸", "lonely"]),
    (Topic::Greeting, &["안녕", "하이", "반가", "hello"]),
    (Topic::Thanks, &["고마워", "고맙", "감사", "thank"]),
    (Topic::Food, &["배고", "밥", "먹었", "맛있", "점심", "저녁", "간식"]),
    (Topic::Weather, &["날씨", "비 와", "비와", "눈 와", "더워", "추워", "weather"]),
    (Topic::Hobby, &["게임", "영화", "음악", "노래", "드라마", "운동", "유튜브"]),
    (Topic::Study, &["공부", "시험", "과제", "숙제", "학교", "수업"]),
    (Topic::Farewell, &["잘 자", "잘자", "바이", "다음에 봐", "또 봐", "bye"]),
];

/// Substring-based topic classifier
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    table: &'static [(Topic, &'static [&'static str])],
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    /// Create a classifier over the built-in keyword table
    pub fn new() -> Self {
        Self {
            table: TOPIC_KEYWORDS,
        }
    }

    /// Classify `text`, returning the first topic whose keyword is a substring of it.
    pub fn classify(&self, text: &str) -> Option<Topic> {
        if text.is_empty() {
            return None;
        }

        self.table
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
            .map(|(topic, _)| *topic)
    }

    /// Keywords registered for a topic
    pub fn keywords(&self, topic: Topic) -> &'static [&'static str] {
        self.table
            .iter()
            .find(|(t, _)| *t == topic)
            .map(|(_, keywords)| *keywords)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_talk_detection() {
        let classifier = KeywordClassifier::new();

        assert_eq!(classifier.classify("안녕 끼리야"), Some(Topic::Greeting));
        assert_eq!(classifier.classify("오늘 날씨 진짜 좋다"), Some(Topic::Weather));
        assert_eq!(classifier.classify("내일 시험이야"), Some(Topic::Study));
    }

    #[test]
    fn test_emotion_wins_over_small_talk() {
        let classifier = KeywordClassifier::new();

        assert_eq!(classifier.classify("안녕, 나 좀 우울해"), Some(Topic::Sad));
        assert_eq!(classifier.classify("밥 먹었는데 짜증나"), Some(Topic::Angry));
    }

    #[test]
    fn test_table_lists_emotions_first() {
        let first_small_talk = TOPIC_KEYWORDS
            .iter()
            .position(|(t, _)| !t.is_emotional())
            .unwrap();
        assert!(TOPIC_KEYWORDS[first_small_talk..]
            .iter()
            .all(|(t, _)| !t.is_emotional()));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let classifier = KeywordClassifier::new();

        assert_eq!(classifier.classify("hello"), Some(Topic::Greeting));
        assert_eq!(classifier.classify("HELLO"), None);
    }

    #[test]
    fn test_no_match() {
        let classifier = KeywordClassifier::new();

        assert_eq!(classifier.classify(""), None);
        assert_eq!(classifier.classify("ㅋㅋㅋ"), None);
    }
}
