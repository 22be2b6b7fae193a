//! Parse LLM output into extraction records

use crate::error::ExtractorError;
use kcache_domain::{AnnotatedDocument, Extraction, ExtractionOutput, FACT};
use serde::de::IgnoredAny;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// JSON schema the hosted model's answer is constrained to
pub const EXTRACTION_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "extractions": {
      "type": "array",
      "items": {
        "type": "object",
        "properties": {
          "extraction_class": { "type": "string" },
          "extraction_text": { "type": "string" }
        },
        "required": ["extraction_class", "extraction_text"]
      }
    }
  },
  "required": ["extractions"]
}"#;

const ATTRIBUTES_SUFFIX: &str = "_attributes";

/// Parse the LLM response into extraction output.
///
/// Accepted shapes:
/// - `{"extractions": [...]}`: one document
/// - `[{...}, ...]`: one document's extraction records
/// - `[{"extractions": [...]}, ...]`: several documents
///
/// An object without an `extractions` key is a document with no extractions
/// collection. Records that cannot be read are skipped with a warning.
pub fn parse_llm_response(response: &str) -> Result<ExtractionOutput, ExtractorError> {
    // LLMs sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    match json {
        Value::Object(obj) => Ok(ExtractionOutput::Single(parse_document(&obj)?)),
        Value::Array(items) if is_batch(&items) => {
            let documents = items
                .iter()
                .filter_map(Value::as_object)
                .map(parse_document)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ExtractionOutput::Batch(documents))
        }
        Value::Array(items) => Ok(ExtractionOutput::Single(AnnotatedDocument::new(
            parse_records(&items),
        ))),
        _ => Err(ExtractorError::InvalidFormat(
            "Expected JSON object or array".to_string(),
        )),
    }
}

/// Extract JSON from response, handling markdown code blocks
///
/// A response that already parses is used as-is, so fences quoted inside
/// extraction text are left alone.
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if serde_json::from_str::<IgnoredAny>(trimmed).is_ok() {
        return Ok(trimmed);
    }

    let Some(fence_start) = trimmed.find("```") else {
        return Ok(trimmed);
    };

    // Skip the opening fence line (```json or ```)
    let after_fence = &trimmed[fence_start + 3..];
    let body_start = after_fence.find('\n').map(|i| i + 1).ok_or_else(|| {
        ExtractorError::InvalidFormat("Empty code block".to_string())
    })?;
    let body = &after_fence[body_start..];

    // Closing fence is the last one, so fences inside strings survive
    let body = match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    };

    Ok(body.trim())
}

fn is_batch(items: &[Value]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|item| item.as_object().is_some_and(|obj| obj.contains_key("extractions")))
}

fn parse_document(obj: &Map<String, Value>) -> Result<AnnotatedDocument, ExtractorError> {
    match obj.get("extractions") {
        None | Some(Value::Null) => Ok(AnnotatedDocument::empty()),
        Some(Value::Array(items)) => Ok(AnnotatedDocument::new(parse_records(items))),
        Some(_) => Err(ExtractorError::InvalidFormat(
            "'extractions' must be an array".to_string(),
        )),
    }
}

fn parse_records(items: &[Value]) -> Vec<Extraction> {
    let mut extractions = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match parse_extraction_json(item) {
            Ok(extraction) => extractions.push(extraction),
            Err(e) => warn!("Failed to parse extraction {}: {}", idx, e),
        }
    }
    extractions
}

/// Parse a single extraction from JSON.
///
/// Besides the `extraction_class`/`extraction_text` form, the keyed form
/// `{"<class>": "<text>", "<class>_attributes": {...}}` is accepted.
fn parse_extraction_json(json: &Value) -> Result<Extraction, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Extraction is not a JSON object".to_string())?;

    if let Some(text) = obj.get("extraction_text") {
        let text = text
            .as_str()
            .ok_or_else(|| "'extraction_text' is not a string".to_string())?;
        let class = obj
            .get("extraction_class")
            .and_then(Value::as_str)
            .unwrap_or(FACT);

        return Ok(Extraction {
            extraction_class: class.to_string(),
            extraction_text: text.to_string(),
            attributes: parse_attributes(obj.get("attributes")),
        });
    }

    if obj.contains_key("extraction_class") {
        return Err("Missing 'extraction_text'".to_string());
    }

    let mut keyed = obj
        .iter()
        .filter(|(key, _)| !key.ends_with(ATTRIBUTES_SUFFIX));
    match (keyed.next(), keyed.next()) {
        (Some((class, Value::String(text))), None) => Ok(Extraction {
            extraction_class: class.clone(),
            extraction_text: text.clone(),
            attributes: parse_attributes(obj.get(&format!("{}{}", class, ATTRIBUTES_SUFFIX))),
        }),
        _ => Err("Missing or invalid 'extraction_text'".to_string()),
    }
}

/// Attribute values that are not strings are kept as their JSON text
fn parse_attributes(value: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(attrs)) = value else {
        return BTreeMap::new();
    };

    attrs
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(response: &str) -> AnnotatedDocument {
        match parse_llm_response(response).unwrap() {
            ExtractionOutput::Single(doc) => doc,
            ExtractionOutput::Batch(_) => panic!("Expected single document"),
        }
    }

    #[test]
    fn test_parse_valid_json() {
        let doc = single(
            r#"{"extractions": [
                {"extraction_class": "fact", "extraction_text": "Alice works at Acme", "attributes": {"company": "Acme"}}
            ]}"#,
        );
        let extractions = doc.extractions.unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].extraction_class, "fact");
        assert_eq!(extractions[0].extraction_text, "Alice works at Acme");
        assert_eq!(extractions[0].attributes["company"], "Acme");
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let doc = single(
            "```json\n{\"extractions\": [{\"extraction_class\": \"summary\", \"extraction_text\": \"Bob lives in Seattle\"}]}\n```",
        );
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_parse_json_with_leading_chatter() {
        let doc = single(
            "Here you go:\n```\n{\"extractions\": [{\"extraction_class\": \"fact\", \"extraction_text\": \"x\"}]}\n```\nDone.",
        );
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_raw_json_quoting_a_fence() {
        let doc = single(
            r#"{"extractions": [{"extraction_class": "fact", "extraction_text": "Wrap code in ```rust fences"}]}"#,
        );
        assert_eq!(
            doc.extractions.unwrap()[0].extraction_text,
            "Wrap code in ```rust fences"
        );
    }

    #[test]
    fn test_multiline_raw_json_quoting_a_fence() {
        let doc = single(
            "{\"extractions\": [\n  {\"extraction_class\": \"key_point\", \"extraction_text\": \"Use ``` for code\"}\n]}",
        );
        assert_eq!(doc.extractions.unwrap()[0].extraction_text, "Use ``` for code");
    }

    #[test]
    fn test_fenced_json_quoting_a_fence() {
        let doc = single(
            "```json\n{\"extractions\": [{\"extraction_class\": \"fact\", \"extraction_text\": \"Use ``` for code\"}]}\n```",
        );
        assert_eq!(doc.extractions.unwrap()[0].extraction_text, "Use ``` for code");
    }

    #[test]
    fn test_parse_bare_array() {
        let doc = single(
            r#"[
                {"extraction_class": "summary", "extraction_text": "s"},
                {"extraction_class": "key_point", "extraction_text": "k"}
            ]"#,
        );
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_parse_batch() {
        let output = parse_llm_response(
            r#"[
                {"extractions": [{"extraction_class": "fact", "extraction_text": "first"}]},
                {"extractions": [{"extraction_class": "fact", "extraction_text": "second"}]}
            ]"#,
        )
        .unwrap();

        match output {
            ExtractionOutput::Batch(docs) => {
                assert_eq!(docs.len(), 2);
                assert_eq!(docs[0].extractions.as_ref().unwrap()[0].extraction_text, "first");
            }
            ExtractionOutput::Single(_) => panic!("Expected batch"),
        }
    }

    #[test]
    fn test_object_without_extractions() {
        let doc = single(r#"{"something_else": 1}"#);
        assert!(doc.extractions.is_none());
    }

    #[test]
    fn test_null_extractions() {
        assert!(single(r#"{"extractions": null}"#).extractions.is_none());
    }

    #[test]
    fn test_extractions_not_array() {
        let result = parse_llm_response(r#"{"extractions": "nope"}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_llm_response("This is not JSON").is_err());
    }

    #[test]
    fn test_parse_scalar_json() {
        assert!(matches!(
            parse_llm_response("42"),
            Err(ExtractorError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_class_defaults_to_fact() {
        let doc = single(r#"{"extractions": [{"extraction_text": "orphan"}]}"#);
        assert_eq!(doc.extractions.unwrap()[0].extraction_class, "fact");
    }

    #[test]
    fn test_keyed_form() {
        let doc = single(
            r#"{"extractions": [
                {"summary": "A summary", "summary_attributes": {"tone": "neutral"}},
                {"key_point": "A point"}
            ]}"#,
        );
        let extractions = doc.extractions.unwrap();
        assert_eq!(extractions[0].extraction_class, "summary");
        assert_eq!(extractions[0].extraction_text, "A summary");
        assert_eq!(extractions[0].attributes["tone"], "neutral");
        assert_eq!(extractions[1].extraction_class, "key_point");
        assert!(extractions[1].attributes.is_empty());
    }

    #[test]
    fn test_partial_success() {
        let doc = single(
            r#"{"extractions": [
                {"extraction_class": "fact", "extraction_text": "kept"},
                {"extraction_class": "fact"},
                "not an object",
                {"extraction_class": "fact", "extraction_text": 12},
                {"extraction_class": "fact", "extraction_text": "also kept"}
            ]}"#,
        );
        let texts: Vec<_> = doc
            .extractions
            .unwrap()
            .into_iter()
            .map(|e| e.extraction_text)
            .collect();
        assert_eq!(texts, vec!["kept", "also kept"]);
    }

    #[test]
    fn test_non_string_attributes_stringified() {
        let doc = single(
            r#"{"extractions": [{"extraction_class": "fact", "extraction_text": "t",
                "attributes": {"years": 3, "remote": true, "gone": null}}]}"#,
        );
        let attrs = &doc.extractions.unwrap()[0].attributes;
        assert_eq!(attrs["years"], "3");
        assert_eq!(attrs["remote"], "true");
        assert!(!attrs.contains_key("gone"));
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap(), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_json_unterminated_fence() {
        let response = "```json\n{\"key\": \"value\"}";
        assert_eq!(extract_json(response).unwrap(), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_empty_code_block() {
        assert!(matches!(
            extract_json("```"),
            Err(ExtractorError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_schema_is_valid_json() {
        let schema: Value = serde_json::from_str(EXTRACTION_SCHEMA).unwrap();
        assert_eq!(schema["required"][0], "extractions");
    }
}
