//! Payload narrowing between the typed internal form and the string-only
//! wire form.
//!
//! Internally a payload is a mapping from string keys to tagged JSON
//! values, so engine and plugin code stay type-aware. The remote-procedure
//! contract constrains values to strings, so the mapping is narrowed only
//! at the serialization edge: scalars are stringified, compound values are
//! serialized to canonical JSON text.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::result::AppResult;

/// The typed key/value payload flowing through the execution pipeline.
pub type Payload = BTreeMap<String, Value>;

/// Widen a wire-form string map into a typed payload.
///
/// Wire values arrive as opaque strings and stay tagged as strings; plugin
/// code decides whether to parse them further.
pub fn payload_from_wire<I>(data: I) -> Payload
where
    I: IntoIterator<Item = (String, String)>,
{
    data.into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// Narrow a typed payload to the string-only wire form.
///
/// String values pass through unquoted, other scalars are stringified, and
/// objects/arrays are serialized to canonical JSON text so the receiver can
/// deserialize them back.
pub fn payload_to_wire(payload: &Payload) -> AppResult<BTreeMap<String, String>> {
    let mut wire = BTreeMap::new();
    for (key, value) in payload {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Object(_) | Value::Array(_) => serde_json::to_string(value)?,
            other => other.to_string(),
        };
        wire.insert(key.clone(), text);
    }
    Ok(wire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_are_stringified() {
        let mut payload = Payload::new();
        payload.insert("x".to_string(), json!(1));
        payload.insert("flag".to_string(), json!(true));
        payload.insert("name".to_string(), json!("plain"));
        payload.insert("nothing".to_string(), json!(null));

        let wire = payload_to_wire(&payload).unwrap();
        assert_eq!(wire["x"], "1");
        assert_eq!(wire["flag"], "true");
        assert_eq!(wire["name"], "plain");
        assert_eq!(wire["nothing"], "null");
    }

    #[test]
    fn test_compound_values_round_trip() {
        let mut payload = Payload::new();
        payload.insert("x".to_string(), json!(1));
        payload.insert("y".to_string(), json!([1, 2]));

        let wire = payload_to_wire(&payload).unwrap();
        assert_eq!(wire["x"], "1");
        assert_eq!(wire["y"], "[1,2]");

        let back: Value = serde_json::from_str(&wire["y"]).unwrap();
        assert_eq!(back, json!([1, 2]));
    }

    #[test]
    fn test_from_wire_keeps_strings_tagged() {
        let payload = payload_from_wire([("id".to_string(), "42".to_string())]);
        assert_eq!(payload["id"], Value::String("42".to_string()));
    }
}
