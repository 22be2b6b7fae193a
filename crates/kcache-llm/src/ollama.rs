//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API. This is the backend used
//! when no hosted API credential is configured.
//!
//! # Features
//!
//! - Async HTTP communication with Ollama API
//! - Configurable endpoint, model and timeout
//! - Optional retry with exponential backoff (single attempt by default)
//! - JSON-constrained output via Ollama's `format` field
//!
//! # Examples
//!
//! ```no_run
//! use kcache_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "gemma2:2b");
//! ```

use crate::LlmError;
use kcache_domain::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (5 minutes; small local models are slow
/// on long pages)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default number of attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_attempts: u32,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<serde_json::Value>,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "gemma2:2b")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Create a new Ollama provider at `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Set the maximum number of attempts (minimum 1)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Endpoint this provider talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Generate text using the Ollama API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available (HTTP 404)
    /// - Network communication fails
    /// - Response format is invalid
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.send(prompt, None).await
    }

    /// Generate output constrained by Ollama's structured-output `format`
    pub async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, LlmError> {
        let format = serde_json::from_str(schema)
            .map_err(|e| LlmError::Other(format!("Invalid JSON schema: {}", e)))?;
        self.send(prompt, Some(format)).await
    }

    async fn send(&self, prompt: &str, format: Option<serde_json::Value>) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format,
        };

        debug!(model = %self.model, url = %url, "Ollama generate request");

        let mut attempts = 0;
        loop {
            attempts += 1;

            let error = match self.client.post(&url).json(&request_body).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<OllamaGenerateResponse>()
                        .await
                        .map(|r| r.response)
                        .map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        });
                }
                Ok(response) => {
                    let status = response.status();
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    LlmError::from_status(status, &error_text, &self.model)
                }
                Err(e) => LlmError::Communication(format!("Request failed: {}", e)),
            };

            if attempts >= self.max_attempts || !error.is_transient() {
                return Err(error);
            }

            // Exponential backoff: 1s, 2s, 4s, etc.
            let delay = Duration::from_secs(2u64.pow(attempts - 1));
            warn!(attempt = attempts, error = %error, "Ollama request failed, retrying in {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}

impl LlmProviderTrait for OllamaProvider {
    type Error = LlmError;

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        OllamaProvider::generate(self, prompt).await
    }

    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        OllamaProvider::generate_structured(self, prompt, schema).await
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
