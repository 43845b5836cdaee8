//! JSON <-> Firestore typed value codec
//!
//! The REST API wraps every value in a single-key object naming its type
//! (`{"stringValue": "hi"}`). Integers travel as decimal strings.

use serde_json::{json, Map, Value};

use crate::FirestoreError;

/// Wrap a plain JSON value in Firestore's typed representation
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode a whole field map
pub fn encode_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

/// Unwrap a typed Firestore value into plain JSON
pub fn decode_value(value: &Value) -> Result<Value, FirestoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| FirestoreError::Decode(format!("expected typed value, got {value}")))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| FirestoreError::Decode("empty typed value".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| FirestoreError::Decode(format!("bad booleanValue: {inner}"))),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| FirestoreError::Decode(format!("bad integerValue: {inner}")))
        }
        "doubleValue" => inner
            .as_f64()
            .map(Value::from)
            .ok_or_else(|| FirestoreError::Decode(format!("bad doubleValue: {inner}"))),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| FirestoreError::Decode(format!("bad {kind}: {inner}"))),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => match inner.get("values") {
            None => Ok(Value::Array(Vec::new())),
            Some(Value::Array(values)) => values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Some(other) => Err(FirestoreError::Decode(format!("bad arrayValue: {other}"))),
        },
        "mapValue" => decode_fields(inner.get("fields").unwrap_or(&Value::Null)).map(Value::Object),
        other => Err(FirestoreError::Decode(format!("unsupported value type {other}"))),
    }
}

/// Decode a typed field map; a missing map decodes as empty
pub fn decode_fields(fields: &Value) -> Result<Map<String, Value>, FirestoreError> {
    match fields {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| decode_value(v).map(|plain| (k.clone(), plain)))
            .collect(),
        other => Err(FirestoreError::Decode(format!("expected field map, got {other}"))),
    }
}
