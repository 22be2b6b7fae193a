//! Core Extractor implementation

use crate::backend::BackendParams;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::{parse_llm_response, EXTRACTION_SCHEMA};
use crate::prompt::{PromptBuilder, PROMPT_DESCRIPTION};
use kcache_domain::{AnnotatedDocument, ExampleData, ExtractionEngine, ExtractionOutput, LlmProvider};
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info};

/// The Extractor turns document text into labeled extractions through an LLM
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: L,
    params: BackendParams,
    config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a new Extractor with default configuration
    pub fn new(llm_provider: L, params: BackendParams) -> Self {
        Self {
            llm_provider,
            params,
            config: ExtractorConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Backend parameters in use
    pub fn params(&self) -> &BackendParams {
        &self.params
    }

    #[cfg(test)]
    pub(crate) fn llm_provider_for_tests(&self) -> &L {
        &self.llm_provider
    }

    /// Extract from `text` with the fixed prompt, keeping the first document
    pub async fn invoke(
        &self,
        text: &str,
        examples: &[ExampleData],
    ) -> Result<AnnotatedDocument, ExtractorError> {
        invoke(self, text, examples, &self.config).await
    }

    /// Call the LLM provider
    async fn call_llm(&self, prompt: &str) -> Result<String, ExtractorError> {
        let result = if self.params.schema_constraints() {
            self.llm_provider
                .generate_structured(prompt, EXTRACTION_SCHEMA)
                .await
        } else {
            self.llm_provider.generate(prompt).await
        };

        result.map_err(|e| ExtractorError::Llm(e.to_string()))
    }
}

impl<L> ExtractionEngine for Extractor<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    type Error = ExtractorError;

    async fn extract(
        &self,
        text: &str,
        prompt_description: &str,
        examples: &[ExampleData],
    ) -> Result<ExtractionOutput, ExtractorError> {
        let start_time = Instant::now();

        let prompt = PromptBuilder::new(prompt_description, text)
            .with_examples(examples)
            .fenced(self.params.fenced())
            .build();

        info!(
            model = %self.llm_provider.model_id(),
            text_chars = text.chars().count(),
            schema = self.params.schema_constraints(),
            "Starting extraction"
        );
        debug!("Prompt length: {} chars", prompt.len());

        let llm_response = self.call_llm(&prompt).await?;

        debug!("LLM response length: {} chars", llm_response.len());

        let output = parse_llm_response(&llm_response)?;

        info!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Extraction complete"
        );

        Ok(output)
    }
}

/// Run one extraction call against `engine`.
///
/// The text is cut to `config.max_input_chars` characters, sent with the
/// fixed instruction and the given examples, and only the first document of
/// a multi-document answer is kept.
pub async fn invoke<E>(
    engine: &E,
    text: &str,
    examples: &[ExampleData],
    config: &ExtractorConfig,
) -> Result<AnnotatedDocument, ExtractorError>
where
    E: ExtractionEngine,
    E::Error: Into<ExtractorError>,
{
    let text = truncate_chars(text, config.max_input_chars);

    let output = engine
        .extract(text, PROMPT_DESCRIPTION, examples)
        .await
        .map_err(Into::into)?;

    if let ExtractionOutput::Batch(documents) = &output {
        if documents.len() > 1 {
            debug!("Engine returned {} documents, keeping the first", documents.len());
        }
    }

    let document = output.into_first();
    info!(extractions = document.len(), "Received extractions");
    Ok(document)
}

/// The first `max_chars` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcache_llm::MockProvider;

    fn create_test_extractor(response: &str, params: BackendParams) -> Extractor<MockProvider> {
        Extractor::new(MockProvider::new(response), params)
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("日本語", 1), "日");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn test_extract_empty_response() {
        let extractor = create_test_extractor(r#"{"extractions": []}"#, BackendParams::local());

        let doc = extractor.invoke("Some text", &[]).await.unwrap();
        assert!(doc.is_empty());
        assert!(doc.extractions.is_some());
    }

    #[tokio::test]
    async fn test_local_backend_uses_plain_generation() {
        let extractor = create_test_extractor(r#"{"extractions": []}"#, BackendParams::local());
        extractor.invoke("Some text", &[]).await.unwrap();

        assert_eq!(extractor.llm_provider.structured_call_count(), 0);
        assert!(!extractor.llm_provider.prompts()[0].contains("```json"));
    }

    #[tokio::test]
    async fn test_hosted_backend_uses_schema() {
        let extractor = create_test_extractor(r#"{"extractions": []}"#, BackendParams::hosted("k"));
        extractor.invoke("Some text", &[]).await.unwrap();

        assert_eq!(extractor.llm_provider.structured_call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_response_is_error() {
        let extractor = create_test_extractor("This is not JSON", BackendParams::local());
        let result = extractor.invoke("Some text", &[]).await;
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_is_llm_error() {
        let extractor = Extractor::new(MockProvider::failing(), BackendParams::local());
        let result = extractor.invoke("Some text", &[]).await;

        match result {
            Err(ExtractorError::Llm(msg)) => assert!(msg.contains("Mock error")),
            other => panic!("Expected Llm error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_input_is_truncated() {
        let config = ExtractorConfig {
            max_input_chars: 10,
            ..Default::default()
        };
        let extractor = create_test_extractor(r#"{"extractions": []}"#, BackendParams::local())
            .with_config(config);

        let text = format!("{}{}", "a".repeat(10), "TAIL");
        extractor.invoke(&text, &[]).await.unwrap();

        let prompt = &extractor.llm_provider.prompts()[0];
        assert!(prompt.contains(&"a".repeat(10)));
        assert!(!prompt.contains("TAIL"));
    }
}
