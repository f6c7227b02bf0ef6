//! Schema-conformance scoring of model responses.
//!
//! The expected response is `{"d": [[s; 5]; 8], "hc": [s; 10], "ct": [s; 30]}`
//! where every `s` is a non-empty string. [`score`] grades a parsed response
//! on a 0–6 scale, top-down:
//!
//! | score | condition                                               |
//! |-------|---------------------------------------------------------|
//! | 0     | content is not valid JSON                               |
//! | 1     | not an object, or any of `d`, `hc`, `ct` missing        |
//! | 2     | all three keys present, at least one is not an array    |
//! | 3–6   | 3, plus one per key whose array has the exact shape     |
//!
//! Key presence is all-or-nothing: an object with two perfect arrays and a
//! missing third key still scores 1.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const KEY_DEFINITION: &str = "d";
pub const KEY_HIGHER_CONTEXTS: &str = "hc";
pub const KEY_CONTEXT_TERMS: &str = "ct";

/// Paragraphs expected in `d`.
pub const DEFINITION_PARAGRAPHS: usize = 8;
/// Sentences expected in each `d` paragraph.
pub const PARAGRAPH_SENTENCES: usize = 5;
pub const HIGHER_CONTEXTS: usize = 10;
pub const CONTEXT_TERMS: usize = 30;

/// Conformance score in `0..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// Content did not parse as JSON (or the request failed).
    pub const UNPARSED: Score = Score(0);
    /// Valid JSON without the three required keys.
    pub const NOT_SCHEMA: Score = Score(1);
    /// All keys present, not all of them arrays.
    pub const NOT_ARRAYS: Score = Score(2);
    /// All keys are arrays; base for the shape bonuses.
    pub const ARRAYS: Score = Score(3);
    pub const MAX: Score = Score(6);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Score parsed content. `None` means the content never parsed.
pub fn score(content: Option<&Value>) -> Score {
    let Some(value) = content else {
        return Score::UNPARSED;
    };
    let Value::Object(map) = value else {
        return Score::NOT_SCHEMA;
    };
    let (Some(d), Some(hc), Some(ct)) = (
        present(map, KEY_DEFINITION),
        present(map, KEY_HIGHER_CONTEXTS),
        present(map, KEY_CONTEXT_TERMS),
    ) else {
        return Score::NOT_SCHEMA;
    };
    let (Value::Array(d), Value::Array(hc), Value::Array(ct)) = (d, hc, ct) else {
        return Score::NOT_ARRAYS;
    };

    let bonus = [
        definition_conforms(d),
        strings_conform(hc, HIGHER_CONTEXTS),
        strings_conform(ct, CONTEXT_TERMS),
    ]
    .into_iter()
    .filter(|ok| *ok)
    .count() as u8;

    Score(Score::ARRAYS.0 + bonus)
}

/// Parse `raw` as JSON and score it; unparseable text scores 0.
pub fn score_text(raw: &str) -> Score {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => score(Some(&value)),
        Err(_) => Score::UNPARSED,
    }
}

/// A key holding JSON `null` counts as missing.
pub(crate) fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn non_empty_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if !s.is_empty())
}

fn strings_conform(items: &[Value], expected: usize) -> bool {
    items.len() == expected && items.iter().all(non_empty_string)
}

fn definition_conforms(paragraphs: &[Value]) -> bool {
    paragraphs.len() == DEFINITION_PARAGRAPHS
        && paragraphs.iter().all(|p| match p {
            Value::Array(sentences) => strings_conform(sentences, PARAGRAPH_SENTENCES),
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn perfect() -> Value {
        json!({
            "d": vec![vec!["s"; 5]; 8],
            "hc": vec!["h"; 10],
            "ct": vec!["c"; 30],
        })
    }

    #[test]
    fn absent_content_scores_zero() {
        assert_eq!(score(None), Score::UNPARSED);
    }

    #[test]
    fn non_object_scores_one() {
        assert_eq!(score(Some(&json!([1, 2, 3]))), Score::NOT_SCHEMA);
        assert_eq!(score(Some(&json!("text"))), Score::NOT_SCHEMA);
        assert_eq!(score(Some(&json!(null))), Score::NOT_SCHEMA);
    }

    #[test]
    fn null_key_counts_as_missing() {
        let v = json!({"d": null, "hc": [], "ct": []});
        assert_eq!(score(Some(&v)), Score::NOT_SCHEMA);
    }

    #[test]
    fn perfect_scores_max() {
        assert_eq!(score(Some(&perfect())), Score::MAX);
    }

    #[test]
    fn paragraph_that_is_not_an_array_loses_bonus() {
        let mut v = perfect();
        v["d"][3] = json!("flat paragraph");
        assert_eq!(score(Some(&v)).value(), 5);
    }

    #[test]
    fn non_string_sentence_loses_bonus() {
        let mut v = perfect();
        v["d"][0][0] = json!(42);
        assert_eq!(score(Some(&v)).value(), 5);
    }

    #[test]
    fn score_text_handles_garbage() {
        assert_eq!(score_text("Sure! Here is your JSON:"), Score::UNPARSED);
        assert_eq!(score_text("{}"), Score::NOT_SCHEMA);
    }

    #[test]
    fn score_serializes_as_integer() {
        assert_eq!(serde_json::to_value(Score::MAX).unwrap(), json!(6));
    }
}
