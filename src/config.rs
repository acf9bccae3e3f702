//! Process configuration loaded from the environment (and `.env` when present).

use std::time::Duration;

use crate::error::{AgentError, Result};

pub const DEFAULT_LLM_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
pub const DEFAULT_FAST_MODEL: &str = "meta/llama-3.1-8b-instruct";
pub const DEFAULT_ACCURATE_MODEL: &str = "meta/llama-3.1-70b-instruct";
pub const DEFAULT_SERPER_BASE_URL: &str = "https://google.serper.dev";

/// Which model profile a step runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    /// Small model used for classification, edits and quick suggestions.
    Fast,
    /// Large model used for full itinerary planning.
    Accurate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProfile {
    pub model: String,
    pub max_tokens: u32,
}

/// Resolved model names for both tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoster {
    pub fast: ModelProfile,
    pub accurate: ModelProfile,
}

impl ModelRoster {
    pub fn profile(&self, tier: ModelTier) -> &ModelProfile {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Accurate => &self.accurate,
        }
    }
}

impl Default for ModelRoster {
    fn default() -> Self {
        Self {
            fast: ModelProfile {
                model: DEFAULT_FAST_MODEL.to_string(),
                max_tokens: 2048,
            },
            accurate: ModelProfile {
                model: DEFAULT_ACCURATE_MODEL.to_string(),
                max_tokens: 4096,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub llm_base_url: String,
    pub models: ModelRoster,
    pub serper_api_key: Option<String>,
    pub serper_base_url: String,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    ///
    /// The LLM key is read from `NVIDIA_NIM_API_KEY`, falling back to
    /// `OPENAI_API_KEY`. Every other value has a default.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let api_key = non_empty_var("NVIDIA_NIM_API_KEY")
            .or_else(|| non_empty_var("OPENAI_API_KEY"))
            .ok_or_else(|| {
                AgentError::Config(
                    "NVIDIA_NIM_API_KEY (or OPENAI_API_KEY) must be set before starting the planner"
                        .to_string(),
                )
            })?;

        let defaults = ModelRoster::default();
        let models = ModelRoster {
            fast: ModelProfile {
                model: non_empty_var("FAST_MODEL").unwrap_or(defaults.fast.model),
                max_tokens: parse_var("FAST_MAX_TOKENS", defaults.fast.max_tokens)?,
            },
            accurate: ModelProfile {
                model: non_empty_var("ACCURATE_MODEL").unwrap_or(defaults.accurate.model),
                max_tokens: parse_var("ACCURATE_MAX_TOKENS", defaults.accurate.max_tokens)?,
            },
        };

        let log_format = match non_empty_var("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AgentError::Config(format!(
                    "LOG_FORMAT must be `text` or `json`, got `{other}`"
                )))
            }
        };

        Ok(Self {
            api_key,
            llm_base_url: non_empty_var("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            models,
            serper_api_key: non_empty_var("SERPER_API_KEY"),
            serper_base_url: non_empty_var("SERPER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SERPER_BASE_URL.to_string()),
            host: non_empty_var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var("PORT", 5328)?,
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 120)?),
            log_level: non_empty_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|err| AgentError::Config(format!("{key} has invalid value `{raw}`: {err}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_profile_lookup() {
        let roster = ModelRoster::default();
        assert_eq!(roster.profile(ModelTier::Fast).model, DEFAULT_FAST_MODEL);
        assert_eq!(roster.profile(ModelTier::Accurate).max_tokens, 4096);
    }

    #[test]
    fn test_parse_var_reports_bad_value() {
        std::env::set_var("WEGO_TEST_BAD_PORT", "not-a-port");
        let err = parse_var::<u16>("WEGO_TEST_BAD_PORT", 1).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        std::env::remove_var("WEGO_TEST_BAD_PORT");
    }
}
