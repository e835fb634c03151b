//! Reasoning provider configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable consulted when no API key is configured
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Which reasoning backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// No heuristic pass; rules only
    None,
    /// Google Generative Language API
    Gemini,
    /// Local Ollama server
    Ollama,
    /// Fixed response, for demos and tests
    Mock,
}

/// Configuration for the reasoning backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Backend to use
    /// Default: gemini
    pub provider: ProviderKind,

    /// Model name; empty means the provider default
    pub model: String,

    /// Override the provider endpoint
    pub endpoint: Option<String>,

    /// API key (Gemini). Prefer `api_key_env` over storing it here.
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    /// Default: GEMINI_API_KEY
    pub api_key_env: String,

    /// HTTP request timeout (seconds)
    /// Default: 30
    pub request_timeout_secs: u64,

    /// Attempts per call, including the first
    /// Default: 3
    pub max_retries: u32,

    /// Response for the mock provider
    pub mock_response: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: String::new(),
            endpoint: None,
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            request_timeout_secs: 30,
            max_retries: 3,
            mock_response: "Legitimate".to_string(),
        }
    }
}

impl ReasoningConfig {
    /// Rules-only configuration
    pub fn disabled() -> Self {
        Self {
            provider: ProviderKind::None,
            ..Default::default()
        }
    }

    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// API key from the config, falling back to the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.provider == ProviderKind::None {
            return Ok(());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("endpoint must be an http(s) URL, got '{}'", endpoint));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReasoningConfig::default();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = ReasoningConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ReasoningConfig {
            endpoint: Some("localhost:11434".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        // Nothing else matters when disabled
        let config = ReasoningConfig {
            max_retries: 0,
            ..ReasoningConfig::disabled()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configured_key_wins() {
        let config = ReasoningConfig {
            api_key: Some("from-file".to_string()),
            api_key_env: "PHARMATRACE_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("from-file"));

        let config = ReasoningConfig {
            api_key: Some("  ".to_string()),
            api_key_env: "PHARMATRACE_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), None);
    }

    #[test]
    fn test_toml_parsing() {
        let config = ReasoningConfig::from_toml(
            r#"
            provider = "ollama"
            model = "llama3"
            endpoint = "http://localhost:11434"
            "#,
        )
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.model, "llama3");
        assert_eq!(config.max_retries, 3);
    }
}
