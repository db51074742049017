//! JSON-safe value normalization.
//!
//! Externally supplied payloads (cache values, event data, view data, email
//! headers, log entries) pass through here before storage. Non-finite
//! floats become null leaves; a payload whose `Serialize` implementation
//! fails outright degrades to null instead of propagating an error into
//! the monitored application.

use serde::Serialize;
use serde_json::Value;

/// Convert an arbitrary serializable payload into a JSON value.
///
/// Non-finite floats turn into null where they sit. Any remaining
/// serialization failure (custom `Serialize` errors, unrepresentable map
/// keys) resolves to `Value::Null` for the payload rather than an error.
pub fn normalize(payload: impl Serialize) -> Value {
    match serde_json::to_value(payload) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("NORMALIZE_FALLBACK error={}", e);
            Value::Null
        }
    }
}

/// Keep a float only when it is representable in JSON.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
