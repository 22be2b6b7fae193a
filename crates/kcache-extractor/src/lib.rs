//! KnowledgeCache Extractor
//!
//! Converts unstructured page text into labeled extractions using an LLM.
//!
//! # Overview
//!
//! The Extractor is the only pathway from raw document text to the structured
//! text that the chunking pipeline indexes. It picks a backend from the
//! environment, prompts the model with a fixed instruction and one worked
//! example, and parses the model's JSON answer into extraction records.
//!
//! # Architecture
//!
//! ```text
//! env → BackendParams → Provider ─┐
//!                                 ▼
//! Text → invoke → Extractor → LLM → parser → AnnotatedDocument → normalize
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use kcache_extractor::{invoke, worked_example, BackendParams, Extractor, ExtractorConfig};
//! use kcache_domain::normalize;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::default();
//! let params = BackendParams::from_env();
//! let extractor = Extractor::new(params.build_provider(&config), params);
//!
//! let document = invoke(&extractor, "Alice works at Acme Corp.", &[worked_example()], &config).await?;
//! println!("{}", normalize(&document));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod backend;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;


pub use backend::{
    select_backend, BackendParams, API_KEY_VARS, HOSTED_MODEL_ID, LOCAL_MODEL_ID, LOCAL_MODEL_URL,
};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::{invoke, truncate_chars, Extractor};
pub use parser::{parse_llm_response, EXTRACTION_SCHEMA};
pub use prompt::{worked_example, PromptBuilder, PROMPT_DESCRIPTION};
