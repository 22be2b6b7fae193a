//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error (auth failure, timeout, model unavailable, ...)
    #[error("LLM error: {0}")]
    Llm(String),

    /// LLM answer did not have the expected shape
    #[error("Invalid extraction format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<kcache_llm::LlmError> for ExtractorError {
    fn from(e: kcache_llm::LlmError) -> Self {
        ExtractorError::Llm(e.to_string())
    }
}
