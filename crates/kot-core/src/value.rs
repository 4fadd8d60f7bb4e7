//! Helpers over dynamic values: stable representation, truthiness and
//! evidence rendering.

use serde_json::Value;

use crate::serde::canonicalize;

/// Stable textual representation used inside instance ids.
///
/// Strings are single quoted with `\` and `'` escaped, numbers and booleans
/// print as JSON, `null` prints as `null`, and composites print as canonical
/// JSON with sorted keys. The result keeps `1` and `'1'` apart.
pub fn repr(value: &Value) -> String {
    match value {
        Value::String(text) => {
            let mut out = String::with_capacity(text.len() + 2);
            out.push('\'');
            for ch in text.chars() {
                match ch {
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    other => out.push(other),
                }
            }
            out.push('\'');
            out
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => value.to_string(),
        composite => canonicalize(composite.clone()).to_string(),
    }
}

/// Truthiness used by selectors: `null`, `false`, zero, and empty strings,
/// arrays or objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Renders evidence for text output: strings verbatim, everything else as JSON.
pub fn render_evidence(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => canonicalize(other.clone()).to_string(),
    }
}
