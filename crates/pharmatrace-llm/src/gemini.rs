//! Gemini Provider Implementation
//!
//! Calls the Google Generative Language REST API
//! (`POST {endpoint}/v1beta/models/{model}:generateContent`).
//!
//! # Examples
//!
//! ```no_run
//! use pharmatrace_llm::GeminiProvider;
//!
//! let provider = GeminiProvider::new("my-api-key", "gemini-1.5-pro-latest").unwrap();
//! ```

use crate::config::DEFAULT_API_KEY_ENV;
use crate::ollama::build_client;
use crate::{status_error, with_retries, LlmError, DEFAULT_RETRY_BASE};
use pharmatrace_domain::traits::ReasoningProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";

/// Default timeout for requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound on generated tokens; verdicts are one line
const MAX_OUTPUT_TOKENS: u32 = 256;

/// Gemini API provider
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_base: Duration,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, LlmError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LlmError::InvalidResponse(format!("prompt blocked: {}", reason)));
        }
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no candidates returned".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(LlmError::InvalidResponse(format!(
                "empty candidate (finish reason {})",
                reason
            )));
        }
        Ok(text)
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// Fails with [`LlmError::MissingApiKey`] if `api_key` is blank.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey(DEFAULT_API_KEY_ENV.to_string()));
        }
        let model = model.into();
        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: if model.trim().is_empty() {
                DEFAULT_MODEL.to_string()
            } else {
                model
            },
            api_key,
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base: DEFAULT_RETRY_BASE,
        })
    }

    /// Point at a different API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error(response, &self.model).await);
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?
            .into_text()
    }
}

impl ReasoningProvider for GeminiProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        debug!("Gemini generate with {} ({} chars)", self.model, prompt.len());
        with_retries(self.max_retries, self.retry_base, || self.generate_once(prompt)).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_api_key_rejected() {
        let err = GeminiProvider::new("  ", DEFAULT_MODEL).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(_)));
    }

    #[test]
    fn test_default_model_and_url() {
        let provider = GeminiProvider::new("key", "")
            .unwrap()
            .with_endpoint("http://127.0.0.1:9999/");
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
        assert_eq!(
            provider.url(),
            "http://127.0.0.1:9999/v1beta/models/gemini-1.5-pro-latest:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GeminiProvider::new("super-secret", DEFAULT_MODEL).unwrap();
        assert!(!format!("{:?}", provider).contains("super-secret"));
    }

    #[test]
    fn test_response_text_extraction() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Flagged: "},{"text":"bad storage"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_text().unwrap(), "Flagged: bad storage");
    }

    #[test]
    fn test_blocked_prompt() {
        let body: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(matches!(body.into_text(), Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_empty_candidates() {
        let body: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(body.into_text().is_err());
    }
}
