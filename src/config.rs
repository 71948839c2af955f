//! Provider selection and model settings, read from an [`EnvStore`].

use crate::{
    env::EnvStore,
    error::{Result, SproutError},
};
use std::{fmt, str::FromStr, time::Duration};

pub const PROVIDER_VAR: &str = "SPROUT_PROVIDER";
pub const BASE_URL_VAR: &str = "SPROUT_BASE_URL";
pub const CHAT_MODEL_VAR: &str = "SPROUT_CHAT_MODEL";
pub const EMBEDDING_MODEL_VAR: &str = "SPROUT_EMBEDDING_MODEL";
pub const TEMPERATURE_VAR: &str = "SPROUT_TEMPERATURE";
pub const TIMEOUT_VAR: &str = "SPROUT_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Hosted model providers reachable through an OpenAI-compatible API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    OpenAI,
    OpenRouter,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
            Provider::OpenRouter => "openrouter",
        }
    }

    /// Environment variables holding the API key, in lookup order
    pub fn api_key_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Provider::OpenAI => &["OPENAI_API_KEY"],
            Provider::OpenRouter => &["OPENROUTER_API_KEY", "OPENAI_API_KEY"],
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_chat_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.5-flash",
            Provider::OpenAI => "gpt-4.1-mini",
            Provider::OpenRouter => "openai/gpt-4.1-mini",
        }
    }

    pub fn default_embedding_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "text-embedding-004",
            Provider::OpenAI => "text-embedding-3-small",
            Provider::OpenRouter => "openai/text-embedding-3-small",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = SproutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            "openrouter" => Ok(Provider::OpenRouter),
            other => Err(SproutError::Config(format!(
                "Unknown provider '{}'; expected gemini, openai or openrouter",
                other
            ))),
        }
    }
}

/// Everything needed to build chat and embedding clients for one provider
#[derive(Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

// Hand-written so the key never reaches a log line.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Config for `provider` with its defaults
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            base_url: provider.default_base_url().to_string(),
            chat_model: provider.default_chat_model().to_string(),
            embedding_model: provider.default_embedding_model().to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read the provider and its settings from `env`
    pub fn from_env<S: EnvStore + ?Sized>(env: &S) -> Result<Self> {
        let provider = match non_empty(env, PROVIDER_VAR) {
            Some(name) => name.parse()?,
            None => Provider::default(),
        };
        Self::from_env_for(provider, env)
    }

    /// Like [`ProviderConfig::from_env`] with the provider already chosen
    pub fn from_env_for<S: EnvStore + ?Sized>(provider: Provider, env: &S) -> Result<Self> {
        let api_key = provider
            .api_key_vars()
            .iter()
            .find_map(|var| non_empty(env, var))
            .ok_or_else(|| {
                SproutError::Config(format!(
                    "No API key for provider '{}'; set {}",
                    provider,
                    provider.api_key_vars().join(" or ")
                ))
            })?;

        let mut config = Self::new(provider, api_key);

        if let Some(base_url) = non_empty(env, BASE_URL_VAR) {
            config.base_url = base_url;
        }
        if let Some(model) = non_empty(env, CHAT_MODEL_VAR) {
            config.chat_model = model;
        }
        if let Some(model) = non_empty(env, EMBEDDING_MODEL_VAR) {
            config.embedding_model = model;
        }
        if let Some(raw) = non_empty(env, TEMPERATURE_VAR) {
            config.temperature = raw.trim().parse().map_err(|_| {
                SproutError::Config(format!("{} must be a number, got '{}'", TEMPERATURE_VAR, raw))
            })?;
        }
        if let Some(raw) = non_empty(env, TIMEOUT_VAR) {
            let secs: u64 = raw
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    SproutError::Config(format!(
                        "{} must be a positive whole number of seconds, got '{}'",
                        TIMEOUT_VAR, raw
                    ))
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn non_empty<S: EnvStore + ?Sized>(env: &S, key: &str) -> Option<String> {
    env.get(key).filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemoryEnv;

    #[test]
    fn test_defaults_to_gemini() {
        let env: MemoryEnv = [("GOOGLE_API_KEY", "g-key")].into_iter().collect();
        let config = ProviderConfig::from_env(&env).unwrap();

        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.api_key, "g-key");
        assert_eq!(config.chat_model, "gemini-2.5-flash");
        assert_eq!(config.embedding_model, "text-embedding-004");
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_key_fallback_order() {
        let env: MemoryEnv = [
            ("SPROUT_PROVIDER", "openrouter"),
            ("OPENAI_API_KEY", "fallback"),
        ]
        .into_iter()
        .collect();
        let config = ProviderConfig::from_env(&env).unwrap();
        assert_eq!(config.provider, Provider::OpenRouter);
        assert_eq!(config.api_key, "fallback");

        let env: MemoryEnv = [
            ("SPROUT_PROVIDER", "openrouter"),
            ("OPENROUTER_API_KEY", "primary"),
            ("OPENAI_API_KEY", "fallback"),
        ]
        .into_iter()
        .collect();
        assert_eq!(ProviderConfig::from_env(&env).unwrap().api_key, "primary");
    }

    #[test]
    fn test_overrides() {
        let env: MemoryEnv = [
            ("SPROUT_PROVIDER", "OpenAI"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SPROUT_BASE_URL", "http://localhost:9999/v1"),
            ("SPROUT_CHAT_MODEL", "gpt-4o"),
            ("SPROUT_TEMPERATURE", "0.7"),
            ("SPROUT_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();
        let config = ProviderConfig::from_env(&env).unwrap();

        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_key_names_variables() {
        let env = MemoryEnv::new();
        let err = ProviderConfig::from_env(&env).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_rejects_unknown_provider_and_bad_numbers() {
        let env: MemoryEnv = [("SPROUT_PROVIDER", "acme")].into_iter().collect();
        assert!(ProviderConfig::from_env(&env).is_err());

        let env: MemoryEnv = [("GOOGLE_API_KEY", "k"), ("SPROUT_TEMPERATURE", "warm")]
            .into_iter()
            .collect();
        assert!(ProviderConfig::from_env(&env).is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let env: MemoryEnv = [("GOOGLE_API_KEY", "k"), ("SPROUT_TIMEOUT_SECS", "0")]
            .into_iter()
            .collect();
        let err = ProviderConfig::from_env(&env).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("SPROUT_TIMEOUT_SECS"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig::new(Provider::OpenAI, "sk-very-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
