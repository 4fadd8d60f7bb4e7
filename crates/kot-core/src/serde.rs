//! JSON helpers with stable key order.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::{ErrorInfo, KotError};

/// Returns `value` with every object's keys in lexicographic order, at any depth.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(key, inner)| (key, canonicalize(inner)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        scalar => scalar,
    }
}

/// Decodes JSON bytes, reporting failures as `serde.json_decode`.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, KotError> {
    serde_json::from_slice(data)
        .map_err(|err| KotError::Serde(ErrorInfo::new("serde.json_decode", err.to_string())))
}
