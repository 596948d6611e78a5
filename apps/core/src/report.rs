//! Weekly mood report data.
//!
//! Counts mood keyword hits in a user's own turns over the last seven days,
//! bucketed by calendar day in Korea Standard Time, and maps the weekly total
//! to a qualitative level with a short piece of advice.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

use crate::database::SqliteConversationLog;
use crate::error::AppError;
use crate::models::{ConversationTurn, Role};

/// Words whose presence in a user turn counts as one low-mood hit each
pub const MOOD_KEYWORDS: &[&str] = &[
    "힘들", "우울", "무기력", "짜증", "귀찮", "죽고 싶", "의욕없", "불안",
];

pub const REPORT_DAYS: i64 = 7;
const KST_OFFSET_HOURS: i64 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodLevel {
    Normal,
    SlightlyLow,
    MildlyDepressed,
    ModeratelyDepressed,
    SeverelyDepressed,
    Critical,
}

impl MoodLevel {
    pub fn from_total(total: u32) -> Self {
        match total {
            0 => MoodLevel::Normal,
            1..=4 => MoodLevel::SlightlyLow,
            5..=9 => MoodLevel::MildlyDepressed,
            10..=14 => MoodLevel::ModeratelyDepressed,
            15..=19 => MoodLevel::SeverelyDepressed,
            _ => MoodLevel::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoodLevel::Normal => "정상 😊",
            MoodLevel::SlightlyLow => "경미한 저하 😐",
            MoodLevel::MildlyDepressed => "약한 우울 😔",
            MoodLevel::ModeratelyDepressed => "중등도 우울 😞",
            MoodLevel::SeverelyDepressed => "심한 우울 😢",
            MoodLevel::Critical => "중증 우울 ⚠️",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            MoodLevel::Normal => "지금처럼 잘 지내자!",
            MoodLevel::SlightlyLow => "조금 지친 것 같아. 산책 어떨까?",
            MoodLevel::MildlyDepressed => "기분이 좀 가라앉아 보여. 생활 리듬을 챙겨보자.",
            MoodLevel::ModeratelyDepressed => "꽤 힘들어 보이네. 스트레칭이나 음악 추천해.",
            MoodLevel::SeverelyDepressed => "힘이 많이 빠진 것 같아. 주변에 이야기해봐.",
            MoodLevel::Critical => "정말 힘든 상태야. 꼭 주변 도움을 요청해줘.",
        }
    }
}

impl fmt::Display for MoodLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyMood {
    pub date: NaiveDate,
    /// `MM/DD`
    pub label: String,
    pub hits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyReport {
    /// Seven entries, oldest day first, the last one is today (KST)
    pub days: Vec<DailyMood>,
    pub total: u32,
    pub level: MoodLevel,
    pub advice: &'static str,
    pub has_logs: bool,
}

/// Number of distinct mood keywords present in `text`
pub fn mood_hits(text: &str) -> u32 {
    MOOD_KEYWORDS.iter().filter(|kw| text.contains(*kw)).count() as u32
}

fn kst_date(at: DateTime<Utc>) -> NaiveDate {
    (at + Duration::hours(KST_OFFSET_HOURS)).date_naive()
}

/// Build the report from stored turns as seen at `now`.
///
/// Turns that are not user-authored, older than seven days, or with an
/// unreadable timestamp are ignored.
pub fn weekly_report(turns: &[ConversationTurn], now: DateTime<Utc>) -> WeeklyReport {
    let today = kst_date(now);
    let since = now - Duration::days(REPORT_DAYS);

    let mut days: Vec<DailyMood> = (0..REPORT_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            DailyMood {
                date,
                label: date.format("%m/%d").to_string(),
                hits: 0,
            }
        })
        .collect();

    for turn in turns.iter().filter(|t| t.role() == Some(Role::User)) {
        let Some(at) = DateTime::from_timestamp_millis(turn.created_at) else {
            continue;
        };
        if at < since {
            continue;
        }
        let date = kst_date(at);
        if let Some(day) = days.iter_mut().find(|d| d.date == date) {
            day.hits += mood_hits(&turn.message);
        }
    }

    let total = days.iter().map(|d| d.hits).sum();
    let level = MoodLevel::from_total(total);
    WeeklyReport {
        days,
        total,
        level,
        advice: level.advice(),
        has_logs: total > 0,
    }
}

/// Load the user's turns of the last seven days and build the report.
pub async fn load_weekly_report(
    log: &SqliteConversationLog,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<WeeklyReport, AppError> {
    let since = now - Duration::days(REPORT_DAYS);
    let turns = log.user_turns_since(user_id, since.timestamp_millis()).await?;
    Ok(weekly_report(&turns, now))
}
