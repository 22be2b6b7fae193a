//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::extraction::{ExampleData, ExtractionOutput};

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (kcache-llm)
#[allow(async_fn_in_trait)]
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Identifier of the model this provider talks to
    fn model_id(&self) -> &str;

    /// Generate text completion
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate output constrained to a JSON schema (if supported)
    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}

/// Trait for the extraction engine: text plus worked examples in, labeled
/// extractions out
///
/// Implemented by the application layer (kcache-extractor). Kept to a single
/// capability so tests can substitute a stub.
#[allow(async_fn_in_trait)]
pub trait ExtractionEngine {
    /// Error type for extraction operations
    type Error;

    /// Extract labeled spans from `text` as steered by the prompt and examples
    async fn extract(
        &self,
        text: &str,
        prompt_description: &str,
        examples: &[ExampleData],
    ) -> Result<ExtractionOutput, Self::Error>;
}
