//! JSON Sanitization
//!
//! The server accepts strict JSON only. Argument values assembled from
//! computed results can carry non-finite floats, which strict JSON has no
//! representation for; these helpers deep-convert such values before
//! serialization. Pure functions, no state. The command client invokes
//! [`sanitize_map`] on every outgoing args mapping.

use serde_json::{Map, Number, Value};

/// Convert a float to a JSON value, mapping NaN and ±infinity to `null`.
pub fn float(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Deep-convert a value into a JSON-safe tree.
///
/// Arrays and objects are walked recursively; scalars pass through
/// unchanged (a `serde_json::Number` is finite by construction, so the
/// only normalization happens when values are built via [`float`]).
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(map) => Value::Object(sanitize_map(map)),
        other => other,
    }
}

/// [`sanitize`] applied to every value of an args mapping.
pub fn sanitize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter().map(|(key, value)| (key, sanitize(value))).collect()
}
