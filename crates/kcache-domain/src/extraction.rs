//! Extraction records - what the engine finds in a document

use std::collections::BTreeMap;

/// Label for the prose summary of a document
pub const SUMMARY: &str = "summary";

/// Label for bulleted key points
pub const KEY_POINT: &str = "key_point";

/// Label for important facts or entities
pub const FACT: &str = "fact";

/// Labels with fixed, privileged placement in the structured output
pub const CANONICAL_LABELS: [&str; 3] = [SUMMARY, KEY_POINT, FACT];

/// One labeled span of text identified within a document
///
/// Produced entirely by the extraction engine. The label is drawn from an
/// open set; anything outside [`CANONICAL_LABELS`] is still carried through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Label of the extraction (e.g. `summary`, `key_point`, `fact`)
    pub extraction_class: String,

    /// Extracted text, ideally verbatim from the source
    pub extraction_text: String,

    /// Attribute name -> value, ordered by name
    pub attributes: BTreeMap<String, String>,
}

impl Extraction {
    /// Create an extraction with no attributes
    pub fn new(extraction_class: impl Into<String>, extraction_text: impl Into<String>) -> Self {
        Self {
            extraction_class: extraction_class.into(),
            extraction_text: extraction_text.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Whether this extraction carries one of the canonical labels
    pub fn is_canonical(&self) -> bool {
        CANONICAL_LABELS.contains(&self.extraction_class.as_str())
    }
}

/// An immutable worked example used for few-shot guidance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleData {
    /// Source text of the example
    pub text: String,

    /// Extractions expected from `text`, in order of appearance
    pub extractions: Vec<Extraction>,
}

impl ExampleData {
    /// Create a worked example
    pub fn new(text: impl Into<String>, extractions: Vec<Extraction>) -> Self {
        Self {
            text: text.into(),
            extractions,
        }
    }
}

/// The engine's response for one input document
///
/// `extractions` is `None` when the response carried no extractions
/// collection at all, which normalizes the same way as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedDocument {
    /// Extractions in the order the engine returned them
    pub extractions: Option<Vec<Extraction>>,
}

impl AnnotatedDocument {
    /// Create a document result from a list of extractions
    pub fn new(extractions: Vec<Extraction>) -> Self {
        Self {
            extractions: Some(extractions),
        }
    }

    /// A result with no extractions collection
    pub fn empty() -> Self {
        Self { extractions: None }
    }

    /// Number of extractions (0 when absent)
    pub fn len(&self) -> usize {
        self.extractions.as_ref().map_or(0, Vec::len)
    }

    /// Whether there are no extractions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw engine output: one document, or a sequence for multi-document calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutput {
    /// Result for a single input document
    Single(AnnotatedDocument),

    /// Results for several documents, in input order
    Batch(Vec<AnnotatedDocument>),
}

impl ExtractionOutput {
    /// Reduce to the first document's result.
    ///
    /// Every document after the first in a batch is discarded. An empty batch
    /// yields a result with no extractions.
    pub fn into_first(self) -> AnnotatedDocument {
        match self {
            ExtractionOutput::Single(document) => document,
            ExtractionOutput::Batch(documents) => documents.into_iter().next().unwrap_or_default(),
        }
    }
}

impl From<AnnotatedDocument> for ExtractionOutput {
    fn from(document: AnnotatedDocument) -> Self {
        ExtractionOutput::Single(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_builder() {
        let extraction = Extraction::new(FACT, "3 years of experience")
            .with_attribute("metric", "experience");

        assert_eq!(extraction.extraction_class, "fact");
        assert_eq!(extraction.attributes.get("metric").unwrap(), "experience");
        assert!(extraction.is_canonical());
    }

    #[test]
    fn test_unknown_label_not_canonical() {
        assert!(!Extraction::new("person", "John").is_canonical());
    }

    #[test]
    fn test_into_first_single() {
        let doc = AnnotatedDocument::new(vec![Extraction::new(SUMMARY, "s")]);
        let output = ExtractionOutput::from(doc.clone());
        assert_eq!(output.into_first(), doc);
    }

    #[test]
    fn test_into_first_discards_rest_of_batch() {
        let first = AnnotatedDocument::new(vec![Extraction::new(FACT, "one")]);
        let second = AnnotatedDocument::new(vec![Extraction::new(FACT, "two")]);
        let output = ExtractionOutput::Batch(vec![first.clone(), second]);
        assert_eq!(output.into_first(), first);
    }

    #[test]
    fn test_into_first_empty_batch() {
        let doc = ExtractionOutput::Batch(vec![]).into_first();
        assert!(doc.extractions.is_none());
        assert!(doc.is_empty());
    }
}
