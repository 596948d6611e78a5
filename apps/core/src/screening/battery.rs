//! The screening battery and the fixed phrase pools around it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Topic covered by one screening item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningTopic {
    Motivation,
    Sleep,
    Appetite,
    Focus,
    Worthlessness,
    Fatigue,
    Anhedonia,
    Social,
    SelfHarm,
}

impl ScreeningTopic {
    pub fn label(&self) -> &'static str {
        match self {
            ScreeningTopic::Motivation => "motivation",
            ScreeningTopic::Sleep => "sleep",
            ScreeningTopic::Appetite => "appetite",
            ScreeningTopic::Focus => "focus",
            ScreeningTopic::Worthlessness => "worthlessness",
            ScreeningTopic::Fatigue => "fatigue",
            ScreeningTopic::Anhedonia => "anhedonia",
            ScreeningTopic::Social => "social",
            ScreeningTopic::SelfHarm => "self_harm",
        }
    }
}

impl fmt::Display for ScreeningTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One question of the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreeningItem {
    pub topic: ScreeningTopic,
    pub prompt: &'static str,
}

/// The battery, in asking order
pub const BATTERY: [ScreeningItem; 9] = [
    ScreeningItem {
        topic: ScreeningTopic::Motivation,
        prompt: "요즘은 의욕이 좀 떨어진 느낌이야?",
    },
    ScreeningItem {
        topic: ScreeningTopic::Sleep,
        prompt: "잠은 잘 자? 아니면 뒤척이거나 자주 깨?",
    },
    ScreeningItem {
        topic: ScreeningTopic::Appetite,
        prompt: "요즘 입맛은 어때? 전이랑 좀 달라?",
    },
    ScreeningItem {
        topic: ScreeningTopic::Focus,
        prompt: "집중이 잘 안 되거나, 수업 때 멍할 때 있어?",
    },
    ScreeningItem {
        topic: ScreeningTopic::Worthlessness,
        prompt: "가끔은 스스로가 쓸모없다고 느껴질 때 있어?",
    },
    ScreeningItem {
        topic: ScreeningTopic::Fatigue,
        prompt: "요즘 피곤하거나 기운 빠질 때가 많아?",
    },
    ScreeningItem {
        topic: ScreeningTopic::Anhedonia,
        prompt: "아무것도 하기 싫을 때 있지?",
    },
    ScreeningItem {
        topic: ScreeningTopic::Social,
        prompt: "사람 만나는 게 귀찮거나 피하고 싶을 때 있어?",
    },
    ScreeningItem {
        topic: ScreeningTopic::SelfHarm,
        prompt: "혹시 죽고 싶거나 사라지고 싶다는 생각이 든 적 있어?",
    },
];

/// Position of a topic in the battery
pub fn index_of(topic: ScreeningTopic) -> Option<usize> {
    BATTERY.iter().position(|item| item.topic == topic)
}

/// Cue substrings that make the dialogue pivot to screening, with the item
/// they point at when there is an obvious one.
pub const CUES: &[(&str, Option<ScreeningTopic>)] = &[
    ("힘들", None),
    ("지쳐", Some(ScreeningTopic::Fatigue)),
    ("귀찮", Some(ScreeningTopic::Social)),
    ("짜증", None),
    ("불안", None),
    ("우울", None),
    ("피곤", Some(ScreeningTopic::Fatigue)),
    ("잠", Some(ScreeningTopic::Sleep)),
    ("식욕", Some(ScreeningTopic::Appetite)),
    ("의욕", Some(ScreeningTopic::Motivation)),
    ("무기력", Some(ScreeningTopic::Anhedonia)),
    ("집중", Some(ScreeningTopic::Focus)),
];

/// Openers used when the dialogue takes the lead without a cue
pub const LEAD_PROMPTS: &[&str] = &[
    "오늘 하루는 어땠어?",
    "요즘 마음은 좀 괜찮아?",
    "최근에 즐겁거나 힘들었던 일 있었어?",
    "요즘 잠은 어떤 편이야?",
    "기운이 좀 떨어지는 날이 많은 편이야?",
    "요즘 밥맛은 어때?",
    "집중은 잘 되는 편이야?",
];

/// Empathetic bridges put in front of a question after an evasive answer
pub const BRIDGE_PHRASES: &[&str] = &[
    "괜찮아, 그렇게 느낄 때도 있어.",
    "응, 말하기 애매할 수도 있지.",
    "그럴 수 있어, 천천히 얘기해도 돼.",
];

/// One-time hint toward the report view
pub const NUDGE_MESSAGE: &str =
    "지금까지 이야기로 어느 정도 파악됐어. 상단 ‘리포트’를 눌러 최근 결과를 확인해볼래?";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_battery_topics_are_unique() {
        let topics: HashSet<_> = BATTERY.iter().map(|item| item.topic).collect();
        assert_eq!(topics.len(), BATTERY.len());
    }

    #[test]
    fn test_index_of() {
        assert_eq!(index_of(ScreeningTopic::Motivation), Some(0));
        assert_eq!(index_of(ScreeningTopic::Fatigue), Some(5));
        assert_eq!(index_of(ScreeningTopic::SelfHarm), Some(8));
    }

    #[test]
    fn test_pools_are_not_empty() {
        assert!(!LEAD_PROMPTS.is_empty());
        assert!(!BRIDGE_PHRASES.is_empty());
        assert!(CUES.iter().any(|(_, topic)| topic.is_some()));
    }
}
