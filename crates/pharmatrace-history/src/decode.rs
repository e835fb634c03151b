//! Decode record payloads into field mappings

use pharmatrace_domain::{FetchError, FieldValue, Record};
use serde_json::{Map, Value};

/// Decode a raw payload into a [`Record`]
///
/// The payload must be a UTF-8 JSON object. Scalars become fields as-is,
/// `null` fields are dropped, and nested objects/arrays are flattened into
/// dotted keys (`sensorStats.min`, `readings.0`).
///
/// # Errors
///
/// Returns [`FetchError::Malformed`] if the bytes are not JSON or the top
/// level is not an object.
///
/// # Examples
///
/// ```
/// use pharmatrace_domain::FieldValue;
/// use pharmatrace_history::decode_record;
///
/// let record = decode_record(br#"{"batchNo": "B1023", "sensorStats": {"min": 2}}"#).unwrap();
/// assert_eq!(record.get("batchNo"), Some(&FieldValue::Text("B1023".into())));
/// assert_eq!(record.get("sensorStats.min"), Some(&FieldValue::Number(2.0)));
/// ```
pub fn decode_record(bytes: &[u8]) -> Result<Record, FetchError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| FetchError::Malformed(format!("JSON parse error: {}", e)))?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(FetchError::Malformed(format!(
                "expected JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut record = Record::new();
    flatten_object("", object, &mut record);
    Ok(record)
}

fn flatten_object(prefix: &str, object: Map<String, Value>, record: &mut Record) {
    for (key, value) in object {
        flatten_value(join_key(prefix, &key), value, record);
    }
}

fn flatten_value(key: String, value: Value, record: &mut Record) {
    match value {
        Value::Null => {}
        Value::Bool(b) => record.insert(key, FieldValue::Bool(b)),
        Value::Number(n) => match n.as_f64() {
            Some(f) => record.insert(key, FieldValue::Number(f)),
            None => record.insert(key, FieldValue::Text(n.to_string())),
        },
        Value::String(s) => record.insert(key, FieldValue::Text(s)),
        Value::Array(items) => {
            for (idx, item) in items.into_iter().enumerate() {
                flatten_value(join_key(&key, &idx.to_string()), item, record);
            }
        }
        Value::Object(object) => flatten_object(&key, object, record),
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_flat_record() {
        let payload = br#"{
            "storageCondition": "cold-chain maintained",
            "sourceManufacturer": "Acme",
            "destManufacturer": "Acme",
            "batchNo": "B1023",
            "quantity": 500,
            "verified": true
        }"#;

        let record = decode_record(payload).unwrap();
        assert_eq!(record.len(), 6);
        assert_eq!(record.get("quantity"), Some(&FieldValue::Number(500.0)));
        assert_eq!(record.get("verified"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn test_decode_drops_nulls() {
        let record = decode_record(br#"{"batchNo": "B1", "notes": null}"#).unwrap();
        assert_eq!(record.len(), 1);
        assert!(record.get("notes").is_none());
    }

    #[test]
    fn test_decode_flattens_nested_values() {
        let payload = br#"{"sensorStats": {"average": 4.5, "max": 7}, "readings": [3, {"t": 4}]}"#;
        let record = decode_record(payload).unwrap();
        assert_eq!(record.get("sensorStats.average"), Some(&FieldValue::Number(4.5)));
        assert_eq!(record.get("sensorStats.max"), Some(&FieldValue::Number(7.0)));
        assert_eq!(record.get("readings.0"), Some(&FieldValue::Number(3.0)));
        assert_eq!(record.get("readings.1.t"), Some(&FieldValue::Number(4.0)));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode_record(b"<html>gateway error</html>").unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_top_level_array() {
        let err = decode_record(br#"[{"batchNo": "B1"}]"#).unwrap_err();
        assert_eq!(err, FetchError::Malformed("expected JSON object, got array".into()));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode_record(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }
}
