//! Runtime configuration, read from the environment (and a `.env` file when present).

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use url::Url;
use validator::Validate;

use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_DATABASE_URL: &str = "sqlite://kkiri.sqlite";

/// How eagerly the dialogue opens with a question of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadMode {
    /// Rarely speaks first
    Calm,
    /// Leads now and then
    #[default]
    Normal,
    /// Leads often
    Active,
}

impl LeadMode {
    /// Probability of a proactive lead prompt
    pub fn chance(&self) -> f64 {
        match self {
            LeadMode::Calm => 0.1,
            LeadMode::Normal => 0.35,
            LeadMode::Active => 0.6,
        }
    }
}

impl fmt::Display for LeadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LeadMode::Calm => "calm",
            LeadMode::Normal => "normal",
            LeadMode::Active => "active",
        };
        f.write_str(name)
    }
}

impl FromStr for LeadMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calm" => Ok(LeadMode::Calm),
            "normal" => Ok(LeadMode::Normal),
            "active" => Ok(LeadMode::Active),
            other => Err(AppError::Config(format!("Unknown lead mode: {}", other))),
        }
    }
}

/// Settings of the dialogue orchestrator and the screening policy.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DialogueConfig {
    pub lead_mode: LeadMode,
    /// How many past user/assistant turns go into the completion context
    #[validate(range(min = 1, max = 100))]
    pub history_limit: usize,
    /// Upper bound for one completion call, in seconds
    #[validate(range(min = 1, max = 600))]
    pub completion_timeout_secs: u64,
    /// Cursor position from which the report nudge is sent
    #[validate(range(min = 1, max = 9))]
    pub nudge_threshold: usize,
    #[validate(range(max = 10))]
    pub question_cooldown: u32,
    #[validate(range(max = 10))]
    pub lead_cooldown: u32,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            lead_mode: LeadMode::Normal,
            history_limit: 10,
            completion_timeout_secs: 30,
            nudge_threshold: 6,
            question_cooldown: 2,
            lead_cooldown: 1,
        }
    }
}

impl DialogueConfig {
    /// Load from `LEAD_MODE`, `KKIRI_HISTORY_LIMIT` and `KKIRI_COMPLETION_TIMEOUT_SECS`.
    ///
    /// An unknown lead mode falls back to `normal`; malformed numbers are errors.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        let mut config = Self::default();

        if let Ok(mode) = env::var("LEAD_MODE") {
            config.lead_mode = mode.parse().unwrap_or_else(|e| {
                warn!("{}, using normal", e);
                LeadMode::Normal
            });
        }
        if let Some(limit) = parse_var("KKIRI_HISTORY_LIMIT")? {
            config.history_limit = limit;
        }
        if let Some(secs) = parse_var("KKIRI_COMPLETION_TIMEOUT_SECS")? {
            config.completion_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
}

/// Connection settings for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompletionConfig {
    /// Base URL up to (not including) `/chat/completions`
    #[validate(length(min = 1))]
    pub base_url: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1))]
    pub api_key: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
}

impl CompletionConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
        }
    }

    /// Load from `OPENAI_API_KEY` (required), `OPENAI_BASE_URL` and `OPENAI_MODEL`.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();

        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| AppError::Config("OPENAI_API_KEY is not set".to_string()))?;
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(base_url, api_key);
        if let Ok(model) = env::var("OPENAI_MODEL") {
            config.model = model;
        }

        config.check()?;
        Ok(config)
    }

    /// Field validation, then the base URL must parse as an http(s) URL with a host
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        let url = Url::parse(&self.base_url)?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(()),
            _ => Err(AppError::Config(format!(
                "OPENAI_BASE_URL must be an http(s) URL, got {}",
                self.base_url
            ))),
        }
    }

    /// `<base_url>/chat/completions`
    pub fn endpoint(&self) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("OPENAI_BASE_URL cannot be a base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["chat", "completions"]);
        Ok(url)
    }
}

/// SQLite URL of the conversation log (`KKIRI_DATABASE_URL`)
pub fn database_url() -> String {
    dotenv::dotenv().ok();
    env::var("KKIRI_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, AppError>
where
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{} is invalid: {}", name, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_mode_chances() {
        assert_eq!(LeadMode::Calm.chance(), 0.1);
        assert_eq!(LeadMode::Normal.chance(), 0.35);
        assert_eq!(LeadMode::Active.chance(), 0.6);
        assert_eq!(" Active ".parse::<LeadMode>().unwrap(), LeadMode::Active);
    }

    #[test]
    fn test_dialogue_config_from_env() {
        temp_env::with_vars(
            [
                ("LEAD_MODE", Some("calm")),
                ("KKIRI_HISTORY_LIMIT", Some("4")),
                ("KKIRI_COMPLETION_TIMEOUT_SECS", None),
            ],
            || {
                let config = DialogueConfig::from_env().expect("config should load");
                assert_eq!(config.lead_mode, LeadMode::Calm);
                assert_eq!(config.history_limit, 4);
                assert_eq!(config.completion_timeout(), Duration::from_secs(30));
            },
        );
    }

    #[test]
    fn test_unknown_lead_mode_falls_back_to_normal() {
        temp_env::with_vars(
            [("LEAD_MODE", Some("chatty")), ("KKIRI_HISTORY_LIMIT", None)],
            || {
                let config = DialogueConfig::from_env().unwrap();
                assert_eq!(config.lead_mode, LeadMode::Normal);
            },
        );
    }

    #[test]
    fn test_invalid_history_limit_is_rejected() {
        temp_env::with_var("KKIRI_HISTORY_LIMIT", Some("0"), || {
            assert!(matches!(DialogueConfig::from_env(), Err(AppError::Validation(_))));
        });
        temp_env::with_var("KKIRI_HISTORY_LIMIT", Some("ten"), || {
            assert!(matches!(DialogueConfig::from_env(), Err(AppError::Config(_))));
        });
    }

    #[test]
    fn test_completion_config_requires_api_key() {
        temp_env::with_var_unset("OPENAI_API_KEY", || {
            assert!(matches!(CompletionConfig::from_env(), Err(AppError::Config(_))));
        });
    }

    #[test]
    fn test_completion_config_from_env() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-test")),
                ("OPENAI_BASE_URL", Some("http://localhost:9999/v1/")),
                ("OPENAI_MODEL", None),
            ],
            || {
                let config = CompletionConfig::from_env().unwrap();
                assert_eq!(config.model, "gpt-4o-mini");
                assert_eq!(
                    config.endpoint().unwrap().as_str(),
                    "http://localhost:9999/v1/chat/completions"
                );
            },
        );
    }

    #[test]
    fn test_completion_config_rejects_non_http_url() {
        let config = CompletionConfig::new("ftp://example.com", "sk-test");
        assert!(matches!(config.check(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_completion_config_rejects_unparsable_url() {
        for base_url in ["http://", "https:// bad host", "localhost:8080/v1"] {
            let config = CompletionConfig::new(base_url, "sk-test");
            assert!(config.check().is_err(), "{}", base_url);
        }

        let config = CompletionConfig::new("http://", "sk-test");
        assert!(matches!(config.check(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_bad_base_url_fails_at_load() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-test")),
                ("OPENAI_BASE_URL", Some("https:// bad host")),
            ],
            || {
                assert!(CompletionConfig::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_endpoint_appends_path_segments() {
        let cases = [
            ("https://api.openai.com/v1", "https://api.openai.com/v1/chat/completions"),
            ("http://localhost:8080", "http://localhost:8080/chat/completions"),
            ("http://localhost:8080/", "http://localhost:8080/chat/completions"),
        ];
        for (base_url, expected) in cases {
            let config = CompletionConfig::new(base_url, "sk-test");
            assert_eq!(config.endpoint().unwrap().as_str(), expected);
        }
    }
}
