//! Canned reply selection.
//!
//! Each topic owns a pool of short replies; one is drawn uniformly at random.
//! Topics without a usable pool fall back to the generic pool.

use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::HashMap;

use super::keywords::Topic;

/// Replies used when the input matched no topic
const GENERIC_REPLIES: &[&str] = &[
    "그렇구나! 조금 더 얘기해줄래?",
    "오 그래? 그래서 어떻게 됐어?",
    "응응, 듣고 있어. 계속 말해줘!",
    "그랬구나. 요즘은 어떻게 지내?",
];

fn pool(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Sad => &[
            "많이 속상했겠다. 무슨 일 있었는지 말해줄 수 있어?",
            "그럴 땐 마음이 무겁지. 내가 옆에서 들어줄게.",
            "울적한 날이구나. 오늘 제일 힘들었던 게 뭐야?",
        ],
        Topic::Anxious => &[
            "걱정되는 일이 있구나. 어떤 게 제일 마음에 걸려?",
            "불안할 땐 숨 한번 크게 쉬어보자. 무슨 일인지 들려줄래?",
        ],
        Topic::Tired => &[
            "요즘 많이 지쳤구나. 오늘은 좀 쉴 수 있어?",
            "고생 많았어. 뭐가 제일 힘들게 했어?",
            "피곤할 땐 잠깐이라도 쉬는 게 좋아. 잠은 좀 잤어?",
        ],
        Topic::Angry => &[
            "헉 짜증날 만했네. 무슨 일이었어?",
            "화날 만하다. 털어놓고 싶으면 다 말해!",
        ],
        Topic::Lonely => &[
            "혼자라고 느껴질 때 있지. 나랑 얘기하자!",
            "외로웠구나. 요즘 자주 그런 느낌이 들어?",
        ],
        Topic::Greeting => &[
            "안녕! 오늘 하루는 어땠어?",
            "반가워! 요즘 어떻게 지내?",
            "왔구나! 오늘 기분은 어때?",
        ],
        Topic::Thanks => &["에이 뭘~ 언제든 말 걸어줘!", "고맙긴! 나도 얘기해서 좋아."],
        Topic::Food => &[
            "오 맛있었겠다! 뭐 먹었어?",
            "밥은 잘 챙겨 먹어야 해. 오늘 뭐 먹었어?",
        ],
        Topic::Weather => &[
            "날씨가 기분에 영향 많이 주지. 오늘은 어땠어?",
            "그런 날엔 따뜻한 거 하나 마시자!",
        ],
        Topic::Hobby => &[
            "오 재밌겠다! 요즘 제일 빠져 있는 게 뭐야?",
            "좋다~ 그거 할 때 기분 어때?",
        ],
        Topic::Study => &[
            "공부하느라 고생이 많아. 요즘 제일 부담되는 게 뭐야?",
            "시험 기간이구나. 너무 무리하진 말고!",
        ],
        Topic::Farewell => &["잘 가! 또 얘기하자~", "푹 쉬어! 다음에 또 봐."],
    }
}

/// Draws one reply per topic from its candidate pool
#[derive(Debug, Clone)]
pub struct ResponseSelector {
    pools: HashMap<Topic, Vec<String>>,
    generic: Vec<String>,
}

impl Default for ResponseSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSelector {
    /// Create a selector with the built-in reply pools
    pub fn new() -> Self {
        let pools = Topic::ALL
            .iter()
            .map(|topic| (*topic, pool(*topic).iter().map(|s| s.to_string()).collect()))
            .collect();
        Self::with_pools(pools)
    }

    /// Create a selector from custom pools.
    ///
    /// Blank replies are dropped; a topic left without replies falls back to the
    /// generic pool at selection time.
    pub fn with_pools(pools: HashMap<Topic, Vec<String>>) -> Self {
        let pools = pools
            .into_iter()
            .map(|(topic, replies)| {
                let replies = replies
                    .into_iter()
                    .filter(|r| !r.trim().is_empty())
                    .collect();
                (topic, replies)
            })
            .collect();

        Self {
            pools,
            generic: GENERIC_REPLIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Candidate replies for a topic, possibly empty
    pub fn candidates(&self, topic: Topic) -> &[String] {
        self.pools.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The generic pool used for unknown or empty topics
    pub fn generic(&self) -> &[String] {
        &self.generic
    }

    /// Pick a reply for `topic` (or for no topic at all)
    pub fn select(&self, topic: Option<Topic>, rng: &mut dyn RngCore) -> &str {
        let pool = match topic.map(|t| self.candidates(t)) {
            Some(candidates) if !candidates.is_empty() => candidates,
            _ => self.generic.as_slice(),
        };

        // The generic pool is a non-empty constant.
        pool.choose(rng).map(String::as_str).unwrap_or(GENERIC_REPLIES[0])
    }
}
