//! Pharmatrace Reasoning Provider Layer
//!
//! Pluggable implementations of the
//! [`ReasoningProvider`](pharmatrace_domain::traits::ReasoningProvider) trait
//! used by the evaluator's heuristic pass.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google Generative Language REST API
//! - `OllamaProvider`: Local Ollama API integration
//! - `ReasoningBackend`: one of the above, picked at runtime from [`ReasoningConfig`]
//!
//! # Examples
//!
//! ```
//! use pharmatrace_llm::MockProvider;
//! use pharmatrace_domain::traits::ReasoningProvider;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new("Legitimate");
//! let result = provider.generate("review these records").await.unwrap();
//! assert_eq!(result, "Legitimate");
//! # }
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod gemini;
pub mod ollama;

use pharmatrace_domain::traits::ReasoningProvider;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use backend::ReasoningBackend;
pub use config::{ProviderKind, ReasoningConfig};
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during reasoning calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// No API key configured for a provider that needs one
    #[error("Missing API key: set {0} or configure reasoning.api_key")]
    MissingApiKey(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether another attempt might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

/// Default delay before the first retry
pub const DEFAULT_RETRY_BASE: Duration = Duration::from_secs(1);

/// Exponential backoff before retry `attempt` (1-based): 1s, 2s, 4s, ...
pub(crate) fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Run `attempt` up to `max_attempts` times, backing off between retryable failures
pub(crate) async fn with_retries<T, F, Fut>(
    max_attempts: u32,
    base: Duration,
    mut attempt: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempts < max_attempts => {
                let delay = backoff_delay(attempts, base);
                debug!("Attempt {} failed ({}), retrying in {:?}", attempts, e, delay);
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Map a non-success HTTP status to an error
pub(crate) async fn status_error(response: reqwest::Response, model: &str) -> LlmError {
    let status = response.status();
    match status {
        reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        _ => {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if status.is_server_error() {
                LlmError::Communication(format!("HTTP {}: {}", status, error_text))
            } else {
                LlmError::Other(format!("HTTP {}: {}", status, error_text))
            }
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    /// (prompt fragment, response); `None` response means error
    responses: Vec<(String, Option<String>)>,
    call_count: usize,
    last_prompt: Option<String>,
}

/// Mock reasoning provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// A scripted response is used when the prompt contains its fragment;
/// otherwise the default response is returned.
///
/// # Examples
///
/// ```
/// use pharmatrace_llm::MockProvider;
/// use pharmatrace_domain::traits::ReasoningProvider;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = MockProvider::new("Legitimate");
/// provider.add_response("X9981", "Flagged: unusual batch");
/// provider.add_error("timeout-me");
///
/// assert_eq!(provider.generate("batch B1").await.unwrap(), "Legitimate");
/// assert_eq!(provider.generate("batch X9981").await.unwrap(), "Flagged: unusual batch");
/// assert!(provider.generate("timeout-me").await.is_err());
/// assert_eq!(provider.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a MockProvider that fails every call
    pub fn failing() -> Self {
        let provider = Self::default();
        provider.add_error("");
        provider
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return `response` for prompts containing `fragment`
    pub fn add_response(&self, fragment: impl Into<String>, response: impl Into<String>) {
        self.state()
            .responses
            .push((fragment.into(), Some(response.into())));
    }

    /// Fail for prompts containing `fragment`
    pub fn add_error(&self, fragment: impl Into<String>) {
        self.state().responses.push((fragment.into(), None));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.state().call_count
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.state().call_count = 0;
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.state().last_prompt.clone()
    }

    fn respond(&self, prompt: &str) -> Result<String, LlmError> {
        let mut state = self.state();
        state.call_count += 1;
        state.last_prompt = Some(prompt.to_string());

        let scripted = state
            .responses
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, response)| response.clone());

        match scripted {
            Some(Some(response)) => Ok(response),
            Some(None) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Legitimate")
    }
}

impl ReasoningProvider for MockProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.respond(prompt)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt").await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("say hello").await.unwrap(), "world");
        assert_eq!(provider.generate("foo?").await.unwrap(), "bar");
        assert_eq!(provider.generate("unknown").await.unwrap(), "Legitimate");
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").await.unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_prompt().as_deref(), Some("prompt2"));

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_failing() {
        let provider = MockProvider::failing();
        let result = provider.generate("anything").await;
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_backoff_delay() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(1, base), Duration::from_secs(1));
        assert_eq!(backoff_delay(2, base), Duration::from_secs(2));
        assert_eq!(backoff_delay(3, base), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retries_stops_on_permanent_error() {
        let mut calls = 0;
        let result: Result<(), LlmError> = with_retries(5, DEFAULT_RETRY_BASE, || {
            calls += 1;
            async { Err(LlmError::ModelNotAvailable("m".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retries_recovers() {
        let mut calls = 0;
        let result = with_retries(3, DEFAULT_RETRY_BASE, || {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Err(LlmError::RateLimitExceeded)
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LlmError::RateLimitExceeded.is_retryable());
        assert!(LlmError::Communication("reset".into()).is_retryable());
        assert!(!LlmError::ModelNotAvailable("x".into()).is_retryable());
        assert!(!LlmError::MissingApiKey("GEMINI_API_KEY".into()).is_retryable());
    }
}
