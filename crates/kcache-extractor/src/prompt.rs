//! LLM prompt engineering for structured extraction

use kcache_domain::{ExampleData, Extraction, FACT, KEY_POINT, SUMMARY};
use serde_json::json;

/// Fixed instruction sent with every extraction call
pub const PROMPT_DESCRIPTION: &str = "\
Extract structured information from the following web page or document text.
Use exact wording from the text where possible. Do not paraphrase heavily.
Provide: a short summary, key points (bullets), and important facts or entities.
Order extractions by appearance. Do not overlap or duplicate.";

/// The worked example illustrating the three canonical labels
pub fn worked_example() -> ExampleData {
    ExampleData::new(
        "John is a Data Engineer at Acme. He works on Python and SQL. He has 3 years of experience.",
        vec![
            Extraction::new(
                SUMMARY,
                "John is a Data Engineer at Acme with 3 years of experience.",
            )
            .with_attribute("role", "Data Engineer")
            .with_attribute("company", "Acme"),
            Extraction::new(KEY_POINT, "Works on Python and SQL").with_attribute("skills", "Python, SQL"),
            Extraction::new(FACT, "3 years of experience").with_attribute("metric", "experience"),
        ],
    )
}

/// Builds prompts for the LLM to extract labeled spans
pub struct PromptBuilder<'a> {
    description: &'a str,
    text: &'a str,
    examples: &'a [ExampleData],
    fenced: bool,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(description: &'a str, text: &'a str) -> Self {
        Self {
            description,
            text,
            examples: &[],
            fenced: false,
        }
    }

    /// Add worked examples
    pub fn with_examples(mut self, examples: &'a [ExampleData]) -> Self {
        self.examples = examples;
        self
    }

    /// Ask for the answer inside a ```json fenced block
    pub fn fenced(mut self, fenced: bool) -> Self {
        self.fenced = fenced;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Instruction
        prompt.push_str(self.description);
        prompt.push_str("\n\n");
        prompt.push_str(FORMAT_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Worked examples
        for example in self.examples {
            prompt.push_str("Example text:\n---\n");
            prompt.push_str(&example.text);
            prompt.push_str("\n---\n");
            prompt.push_str("Example output:\n");
            prompt.push_str(&self.answer(&example.extractions));
            prompt.push_str("\n\n");
        }

        // 3. The text to analyze
        prompt.push_str("Text to analyze:\n---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        // 4. Output format reminder
        if self.fenced {
            prompt.push_str(FENCED_REMINDER);
        } else {
            prompt.push_str(RAW_REMINDER);
        }

        prompt
    }

    /// Render extractions the way the model should answer
    fn answer(&self, extractions: &[Extraction]) -> String {
        let json = render_extractions(extractions);
        if self.fenced {
            format!("```json\n{}\n```", json)
        } else {
            json
        }
    }
}

/// Serialize extractions in the answer format
fn render_extractions(extractions: &[Extraction]) -> String {
    let records: Vec<_> = extractions
        .iter()
        .map(|e| {
            json!({
                "extraction_class": e.extraction_class,
                "extraction_text": e.extraction_text,
                "attributes": e.attributes,
            })
        })
        .collect();

    // Serializing a Value built from strings cannot fail
    serde_json::to_string_pretty(&json!({ "extractions": records })).unwrap_or_default()
}

const FORMAT_INSTRUCTIONS: &str = r#"Answer with a JSON object holding an "extractions" array.
Each extraction has:
- "extraction_class": one of "summary", "key_point", "fact" (other labels are allowed when nothing else fits)
- "extraction_text": the extracted text
- "attributes": an object of string attributes describing the extraction"#;

const RAW_REMINDER: &str =
    "Return ONLY valid JSON, no markdown code blocks, no explanations.";

const FENCED_REMINDER: &str =
    "Return the JSON inside a single ```json fenced code block, no explanations.";
