//! Runtime-selected reasoning backend

use crate::config::{ProviderKind, ReasoningConfig};
use crate::{gemini, ollama, GeminiProvider, LlmError, MockProvider, OllamaProvider};
use pharmatrace_domain::traits::ReasoningProvider;
use tracing::info;

/// One of the concrete providers, chosen from configuration
pub enum ReasoningBackend {
    /// Google Generative Language API
    Gemini(GeminiProvider),
    /// Local Ollama server
    Ollama(OllamaProvider),
    /// Fixed responses
    Mock(MockProvider),
}

impl ReasoningBackend {
    /// Build the configured backend; `Ok(None)` when the heuristic pass is off
    pub fn from_config(config: &ReasoningConfig) -> Result<Option<Self>, LlmError> {
        config.validate().map_err(LlmError::Other)?;

        let backend = match config.provider {
            ProviderKind::None => return Ok(None),
            ProviderKind::Gemini => {
                let api_key = config
                    .resolve_api_key()
                    .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;
                let mut provider = GeminiProvider::new(api_key, model_or(config, gemini::DEFAULT_MODEL))?
                    .with_max_retries(config.max_retries)
                    .with_timeout(config.request_timeout())?;
                if let Some(endpoint) = &config.endpoint {
                    provider = provider.with_endpoint(endpoint.as_str());
                }
                ReasoningBackend::Gemini(provider)
            }
            ProviderKind::Ollama => {
                let endpoint = config.endpoint.as_deref().unwrap_or(ollama::DEFAULT_ENDPOINT);
                let provider = OllamaProvider::new(endpoint, model_or(config, ollama::DEFAULT_MODEL))?
                    .with_max_retries(config.max_retries)
                    .with_timeout(config.request_timeout())?;
                ReasoningBackend::Ollama(provider)
            }
            ProviderKind::Mock => ReasoningBackend::Mock(MockProvider::new(config.mock_response.as_str())),
        };

        info!("Reasoning backend: {}", backend.model_name());
        Ok(Some(backend))
    }
}

fn model_or(config: &ReasoningConfig, default: &str) -> String {
    if config.model.trim().is_empty() {
        default.to_string()
    } else {
        config.model.clone()
    }
}

impl ReasoningProvider for ReasoningBackend {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            ReasoningBackend::Gemini(p) => p.generate(prompt).await,
            ReasoningBackend::Ollama(p) => p.generate(prompt).await,
            ReasoningBackend::Mock(p) => p.generate(prompt).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            ReasoningBackend::Gemini(p) => p.model_name(),
            ReasoningBackend::Ollama(p) => p.model_name(),
            ReasoningBackend::Mock(p) => p.model_name(),
        }
    }
}
