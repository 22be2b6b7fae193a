//! KnowledgeCache LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `kcache-domain`.
//!
//! # Providers
//!
//! - `GeminiProvider`: hosted Gemini API, used when an API key is configured
//! - `OllamaProvider`: local Ollama server, used otherwise
//! - `Provider`: one of the two, chosen at runtime
//! - `MockProvider`: deterministic mock for testing
//!
//! # Examples
//!
//! ```
//! use kcache_llm::MockProvider;
//! use kcache_domain::LlmProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod ollama;

use kcache_domain::LlmProvider as LlmProviderTrait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Credential rejected by the provider
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Map a non-success HTTP status to an error
    pub(crate) fn from_status(status: StatusCode, body: &str, model: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                LlmError::Authentication(format!("HTTP {}: {}", status, body))
            }
            StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
            _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
        }
    }

    /// Whether another attempt could succeed
    pub(crate) fn is_transient(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

/// A provider chosen at runtime
pub enum Provider {
    /// Hosted Gemini API
    Gemini(GeminiProvider),
    /// Local Ollama server
    Ollama(OllamaProvider),
}

impl LlmProviderTrait for Provider {
    type Error = LlmError;

    fn model_id(&self) -> &str {
        match self {
            Provider::Gemini(p) => p.model_id(),
            Provider::Ollama(p) => p.model_id(),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            Provider::Gemini(p) => p.generate(prompt).await,
            Provider::Ollama(p) => p.generate(prompt).await,
        }
    }

    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        match self {
            Provider::Gemini(p) => p.generate_structured(prompt, schema).await,
            Provider::Ollama(p) => p.generate_structured(prompt, schema).await,
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls, and records every prompt it receives.
///
/// # Examples
///
/// ```
/// use kcache_llm::MockProvider;
/// use kcache_domain::LlmProvider;
///
/// # tokio_test::block_on(async {
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// assert_eq!(provider.generate("prompt1").await.unwrap(), "response1");
/// assert_eq!(provider.prompts(), vec!["prompt1".to_string()]);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    structured_calls: Arc<Mutex<usize>>,
    fail_all: bool,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            structured_calls: Arc::new(Mutex::new(0)),
            fail_all: false,
        }
    }

    /// Create a provider that fails every call
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Every prompt received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Get the number of times generate was called (either flavor)
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Get the number of schema-constrained calls
    pub fn structured_call_count(&self) -> usize {
        *self.structured_calls.lock().unwrap()
    }

    fn respond(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if self.fail_all {
            return Err(LlmError::Other("Mock error".to_string()));
        }

        let responses = self.responses.lock().unwrap();
        Ok(responses
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn model_id(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.respond(prompt)
    }

    async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        *self.structured_calls.lock().unwrap() += 1;
        self.respond(prompt)
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
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello").await.unwrap(), "world");
        assert_eq!(provider.generate("foo").await.unwrap(), "bar");
        assert_eq!(provider.generate("unknown").await.unwrap(), "Default mock response");
    }

    #[tokio::test]
    async fn test_mock_provider_records_prompts() {
        let provider = MockProvider::new("test");

        provider.generate("prompt1").await.unwrap();
        provider.generate_structured("prompt2", "{}").await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.structured_call_count(), 1);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);
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
    fn test_status_mapping() {
        assert!(matches!(
            LlmError::from_status(StatusCode::UNAUTHORIZED, "bad key", "m"),
            LlmError::Authentication(_)
        ));
        assert!(matches!(
            LlmError::from_status(StatusCode::NOT_FOUND, "", "gemma2:2b"),
            LlmError::ModelNotAvailable(m) if m == "gemma2:2b"
        ));
        assert!(matches!(
            LlmError::from_status(StatusCode::TOO_MANY_REQUESTS, "", "m"),
            LlmError::RateLimitExceeded
        ));
        assert!(matches!(
            LlmError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom", "m"),
            LlmError::Communication(_)
        ));
    }

    #[test]
    fn test_transient_errors() {
        assert!(LlmError::Communication("x".into()).is_transient());
        assert!(LlmError::RateLimitExceeded.is_transient());
        assert!(!LlmError::Authentication("x".into()).is_transient());
        assert!(!LlmError::ModelNotAvailable("x".into()).is_transient());
    }
}
