//! Tolerant value coercion.
//!
//! Reads fields out of an external snapshot mapping during record
//! reconstruction. A value of the wrong shape yields `None` so the target
//! field stays at its default; nothing here returns an error.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Coerce a value to a string if possible.
pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a value to a float if possible.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Coerce a value to an unsigned integer if possible.
pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Coerce a value to a `u32` if possible.
pub fn as_u32(value: &Value) -> Option<u32> {
    as_u64(value).and_then(|n| u32::try_from(n).ok())
}

/// Coerce a value to an `i32` if possible.
pub fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Borrow a value as an object mapping if it is one.
pub fn as_map(value: &Value) -> Option<Map<String, Value>> {
    value.as_object().cloned()
}

/// Borrow a value as a plain sequence if it is one.
pub fn as_values(value: &Value) -> Option<Vec<Value>> {
    value.as_array().cloned()
}

/// Coerce a value to a sequence of strings, dropping non-string items.
pub fn as_string_vec(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.to_string()))
            .collect()
    })
}

/// Coerce a value to a sequence of typed entries, dropping items that do
/// not match the entry shape.
pub fn as_entries<T: DeserializeOwned>(value: &Value) -> Option<Vec<T>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect()
    })
}

/// Coerce a value to an index-ordered collection.
///
/// Accepts either a plain sequence (indices assigned positionally) or an
/// object whose keys parse as indices; non-numeric keys are dropped.
pub fn as_indexed(value: &Value) -> Option<BTreeMap<u64, Value>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| (i as u64, item.clone()))
                .collect(),
        ),
        Value::Object(map) => Some(
            map.iter()
                .filter_map(|(k, v)| k.parse().ok().map(|i: u64| (i, v.clone())))
                .collect(),
        ),
        _ => None,
    }
}
