//! One-line structural description of parsed content, shown above the
//! pretty-printed JSON so shape problems are visible without reading it.

use serde_json::Value;

use crate::scoring::{present, KEY_CONTEXT_TERMS, KEY_DEFINITION, KEY_HIGHER_CONTEXTS};

/// Describe which schema keys exist and how long their arrays are, e.g.
/// `Content info: JSON object contains key d=array(2)[array(5), not-array], key hc=array(10)`.
pub fn describe_content(value: &Value) -> String {
    let mut out = String::from("Content info: ");
    let Value::Object(map) = value else {
        out.push_str("Not a JSON object.");
        return out;
    };

    let mut parts = Vec::new();
    if let Some(d) = present(map, KEY_DEFINITION) {
        parts.push(format!("key {}={}", KEY_DEFINITION, describe_paragraphs(d)));
    }
    for key in [KEY_HIGHER_CONTEXTS, KEY_CONTEXT_TERMS] {
        if let Some(v) = present(map, key) {
            parts.push(format!("key {}={}", key, describe_array(v)));
        }
    }

    if parts.is_empty() {
        out.push_str("JSON object contains none of keys d, hc, ct");
    } else {
        out.push_str("JSON object contains ");
        out.push_str(&parts.join(", "));
    }
    out
}

fn describe_array(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("array({})", items.len()),
        _ => "not-array".to_string(),
    }
}

fn describe_paragraphs(value: &Value) -> String {
    match value {
        Value::Array(paragraphs) => {
            let inner: Vec<String> = paragraphs.iter().map(describe_array).collect();
            format!("array({})[{}]", paragraphs.len(), inner.join(", "))
        }
        _ => "not-array".to_string(),
    }
}
