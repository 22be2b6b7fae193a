//! KnowledgeCache Domain Layer
//!
//! Core model for turning unstructured page text into chunk-ready structured
//! text. It has ZERO external dependencies and defines the extraction
//! records, the trait seams toward LLM backends, and the pure normalizer
//! that canonicalizes extraction results.
//!
//! ## Key Concepts
//!
//! - **Extraction**: one labeled span of text found in a document
//! - **Canonical labels**: `summary`, `key_point`, `fact`, which always lead
//!   the structured output in that order
//! - **Worked example**: a document plus the extractions expected from it,
//!   used to steer the engine's output format
//! - **Structured text**: the deterministic, sectioned output of [`normalize`]
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Infrastructure (HTTP providers, prompts, CLI) lives in other crates
//! - Trait definitions for every external interaction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extraction;
pub mod normalize;
pub mod traits;

// Re-exports for convenience
pub use extraction::{
    AnnotatedDocument, ExampleData, Extraction, ExtractionOutput, CANONICAL_LABELS, FACT,
    KEY_POINT, SUMMARY,
};
pub use normalize::{normalize, section_title, title_case};
pub use traits::{ExtractionEngine, LlmProvider};
