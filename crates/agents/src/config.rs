use std::env;
use std::time::Duration;

use crate::extractor::DEFAULT_MAX_REPAIRS;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL_TIMEOUT_SECONDS: u64 = 60;

/// Process-wide extraction settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub demo_mode: bool,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout: Duration,
    pub max_repairs: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            demo_mode: false,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECONDS),
            max_repairs: DEFAULT_MAX_REPAIRS,
        }
    }
}

impl ExtractorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let demo_mode = lookup("DEMO_MODE")
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let model = lookup("OPENAI_MODEL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.model);
        let api_key = lookup("OPENAI_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let base_url = lookup("OPENAI_BASE_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.base_url);
        let request_timeout = lookup("VOYAGE_MODEL_TIMEOUT_SECONDS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let max_repairs = lookup("VOYAGE_MAX_REPAIRS")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(defaults.max_repairs);

        Self {
            demo_mode,
            model,
            api_key,
            base_url,
            request_timeout,
            max_repairs,
        }
    }
}
