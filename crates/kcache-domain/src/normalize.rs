//! Canonicalization of extraction results into structured text
//!
//! Output is a sequence of sections separated by a blank line:
//!
//! ```text
//! Summary:
//! <summary line>
//!
//! Key points:
//! - <point>
//!
//! Facts:
//! - <fact>
//!
//! <Other Label>:
//! - <item>
//! ```
//!
//! Canonical sections always lead in that order. Any other label follows,
//! sorted by its raw label string, never by order of first appearance.

use crate::extraction::{AnnotatedDocument, FACT, KEY_POINT, SUMMARY};
use std::collections::BTreeMap;

/// Turn a document result into one structured text for chunking.
///
/// Total: a missing or empty extractions collection, or records whose text
/// is blank, yield fewer sections or an empty string, never an error.
///
/// # Examples
///
/// ```
/// use kcache_domain::{normalize, AnnotatedDocument, Extraction};
///
/// let doc = AnnotatedDocument::new(vec![Extraction::new("fact", "Hello world")]);
/// assert_eq!(normalize(&doc), "Facts:\n- Hello world");
/// ```
pub fn normalize(document: &AnnotatedDocument) -> String {
    let extractions = match document.extractions.as_deref() {
        Some(extractions) if !extractions.is_empty() => extractions,
        _ => return String::new(),
    };

    // label -> texts in original relative order
    let mut by_label: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for extraction in extractions {
        let text = extraction.extraction_text.trim();
        if text.is_empty() {
            continue;
        }
        by_label
            .entry(extraction.extraction_class.as_str())
            .or_default()
            .push(text);
    }

    let mut sections = Vec::new();

    if let Some(items) = by_label.remove(SUMMARY) {
        sections.push(format!("Summary:\n{}", items.join("\n")));
    }
    if let Some(items) = by_label.remove(KEY_POINT) {
        sections.push(bulleted("Key points", &items));
    }
    if let Some(items) = by_label.remove(FACT) {
        sections.push(bulleted("Facts", &items));
    }

    for (label, items) in &by_label {
        sections.push(bulleted(&section_title(label), items));
    }

    sections.join("\n\n")
}

/// Header text for a non-canonical label: underscores become spaces, then
/// every word is title-cased (`foo_bar` -> `Foo Bar`).
pub fn section_title(label: &str) -> String {
    title_case(&label.replace('_', " "))
}

/// Upper-case the first letter of every run of cased letters and lower-case
/// the rest. Any uncased character (digit, space, CJK) ends the run.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_lowercase() || c.is_uppercase() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

fn bulleted(title: &str, items: &[&str]) -> String {
    let mut section = format!("{}:", title);
    for item in items {
        section.push_str("\n- ");
        section.push_str(item);
    }
    section
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::extraction::Extraction;
    use proptest::prelude::*;

    fn headers(output: &str) -> Vec<String> {
        output
            .split("\n\n")
            .filter_map(|section| section.lines().next())
            .map(str::to_string)
            .collect()
    }

    proptest! {
        /// Property: section order never depends on record order
        #[test]
        fn test_section_order_is_input_order_independent(
            order in Just(vec![
                ("summary", "S"),
                ("key_point", "K"),
                ("fact", "F"),
                ("foo_bar", "X"),
            ]).prop_shuffle()
        ) {
            let doc = AnnotatedDocument::new(
                order.iter().map(|(c, t)| Extraction::new(*c, *t)).collect(),
            );
            let output = normalize(&doc);

            prop_assert_eq!(
                headers(&output),
                vec!["Summary:", "Key points:", "Facts:", "Foo Bar:"]
            );
        }

        /// Property: unknown labels follow canonical ones, sorted by raw label
        #[test]
        fn test_unknown_sections_sorted(labels in prop::collection::btree_set("[a-z]{1,8}", 1..6)) {
            let labels: Vec<String> = labels
                .into_iter()
                .filter(|l| !["summary", "fact"].contains(&l.as_str()))
                .collect();
            let mut reversed = labels.clone();
            reversed.reverse();

            let doc = AnnotatedDocument::new(
                reversed.iter().map(|l| Extraction::new(l.clone(), "item")).collect(),
            );
            let expected: Vec<String> = labels.iter().map(|l| format!("{}:", section_title(l))).collect();

            prop_assert_eq!(headers(&normalize(&doc)), expected);
        }

        /// Property: normalize never panics on arbitrary text
        #[test]
        fn test_normalize_is_total(class in ".{0,12}", text in ".{0,40}") {
            let doc = AnnotatedDocument::new(vec![Extraction::new(class, text)]);
            let _ = normalize(&doc);
        }
    }
}
