use std::env;
use std::time::Duration;

use tracing::warn;

use crate::api_connection::endpoints::{OPENROUTER_CHAT_URL, OPENROUTER_MODELS};

// The single credential. When unset or blank the offline (demo) path is taken.
pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV_VAR: &str = "NUTRILAB_MODEL";
pub const API_URL_ENV_VAR: &str = "NUTRILAB_API_URL";
pub const PARSE_DELAY_ENV_VAR: &str = "NUTRILAB_PARSE_DELAY_MS";
pub const PLAN_DELAY_ENV_VAR: &str = "NUTRILAB_PLAN_DELAY_MS";

const DEFAULT_PARSE_DELAY: Duration = Duration::from_millis(2000);
const DEFAULT_PLAN_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub site_url: String,
    pub app_name: String,
    /// Simulated latency of the offline report parser.
    pub parse_delay: Duration,
    /// Simulated latency of the offline plan generator.
    pub plan_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: OPENROUTER_MODELS[0].model_name.to_string(),
            api_url: OPENROUTER_CHAT_URL.to_string(),
            site_url: "http://localhost:3000".to_string(),
            app_name: "NutriLab".to_string(),
            parse_delay: DEFAULT_PARSE_DELAY,
            plan_delay: DEFAULT_PLAN_DELAY,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the environment. Never fails:
    /// anything missing or malformed keeps its default.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let delay = |key: &str, default: Duration| match text(key) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    warn!(key, value = %raw, "Ignoring malformed delay, using default");
                    default
                }
            },
            None => default,
        };

        Self {
            api_key: text(API_KEY_ENV_VAR),
            model: text(MODEL_ENV_VAR).unwrap_or(defaults.model),
            api_url: text(API_URL_ENV_VAR).unwrap_or(defaults.api_url),
            site_url: text("SITE_URL").unwrap_or(defaults.site_url),
            app_name: text("APP_NAME").unwrap_or(defaults.app_name),
            parse_delay: delay(PARSE_DELAY_ENV_VAR, defaults.parse_delay),
            plan_delay: delay(PLAN_DELAY_ENV_VAR, defaults.plan_delay),
        }
    }

    /// No credential and no simulated latency.
    pub fn offline() -> Self {
        Self {
            parse_delay: Duration::ZERO,
            plan_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_blank_api_key_means_no_credentials() {
        let config = AppConfig::from_lookup(lookup(&[(API_KEY_ENV_VAR, "   ")]));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_overrides_and_malformed_delay() {
        let config = AppConfig::from_lookup(lookup(&[
            (API_KEY_ENV_VAR, "sk-test"),
            (MODEL_ENV_VAR, "openai/gpt-4o-mini"),
            (PARSE_DELAY_ENV_VAR, "10"),
            (PLAN_DELAY_ENV_VAR, "soon"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert_eq!(config.parse_delay, Duration::from_millis(10));
        assert_eq!(config.plan_delay, DEFAULT_PLAN_DELAY);
    }
}
