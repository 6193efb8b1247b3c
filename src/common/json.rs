//! Typed field extraction over a parsed JSON object.
//!
//! Each helper names the field it failed on so decode errors point at the
//! offending key rather than at a byte offset. A key holding `null` reads the
//! same as an absent key.

use serde_json::{Map, Value};

use crate::common::error::{MetaError, MetaResult};

pub type Object = Map<String, Value>;

fn present<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|value| !value.is_null())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "an integer",
        Value::Number(_) => "a fractional number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Extract a non-negative integer for the provided key.
pub fn extract_u64(obj: &Object, key: &str, path: &str) -> MetaResult<Option<u64>> {
    let Some(value) = present(obj, key) else {
        return Ok(None);
    };
    if let Some(n) = value.as_u64() {
        return Ok(Some(n));
    }
    let reason = match value.as_i64() {
        Some(n) => format!("expected a non-negative integer, found {n}"),
        None => format!("expected a non-negative integer, found {}", describe(value)),
    };
    Err(MetaError::malformed(path, reason))
}

/// Extract a required non-negative integer for the provided key.
pub fn require_u64(obj: &Object, key: &str, path: &str) -> MetaResult<u64> {
    extract_u64(obj, key, path)?
        .ok_or_else(|| MetaError::malformed(path, "missing required field"))
}

/// Extract a string value for the provided key.
pub fn extract_string<'a>(obj: &'a Object, key: &str, path: &str) -> MetaResult<Option<&'a str>> {
    match present(obj, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(MetaError::malformed(
            path,
            format!("expected a string, found {}", describe(other)),
        )),
    }
}

/// Extract a required string value for the provided key.
pub fn require_string<'a>(obj: &'a Object, key: &str, path: &str) -> MetaResult<&'a str> {
    extract_string(obj, key, path)?
        .ok_or_else(|| MetaError::malformed(path, "missing required field"))
}

/// Extract an array for the provided key.
pub fn extract_array<'a>(obj: &'a Object, key: &str, path: &str) -> MetaResult<Option<&'a [Value]>> {
    match present(obj, key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.as_slice())),
        Some(other) => Err(MetaError::malformed(
            path,
            format!("expected an array, found {}", describe(other)),
        )),
    }
}

/// View a value as an object, or fail naming `path`.
pub fn as_object<'a>(value: &'a Value, path: &str) -> MetaResult<&'a Object> {
    value.as_object().ok_or_else(|| {
        MetaError::malformed(path, format!("expected an object, found {}", describe(value)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn integers_must_be_non_negative_whole_numbers() {
        let o = obj(json!({"a": 3, "b": -1, "c": 2.5, "d": "7", "e": null}));
        assert_eq!(extract_u64(&o, "a", "a").unwrap(), Some(3));
        assert!(extract_u64(&o, "b", "b").unwrap_err().to_string().contains("-1"));
        assert!(extract_u64(&o, "c", "c").unwrap_err().to_string().contains("fractional"));
        assert!(extract_u64(&o, "d", "d").is_err());
        assert_eq!(extract_u64(&o, "e", "e").unwrap(), None);
        assert_eq!(extract_u64(&o, "zz", "zz").unwrap(), None);
    }

    #[test]
    fn missing_required_names_the_path() {
        let o = obj(json!({}));
        let err = require_u64(&o, "numRows", "numRows").unwrap_err();
        assert_eq!(err.field(), Some("numRows"));
    }

    #[test]
    fn strings_and_arrays() {
        let o = obj(json!({"s": "x", "n": 1, "a": [1, 2]}));
        assert_eq!(extract_string(&o, "s", "s").unwrap(), Some("x"));
        assert!(extract_string(&o, "n", "n").is_err());
        assert_eq!(extract_array(&o, "a", "a").unwrap().map(|a| a.len()), Some(2));
        assert!(extract_array(&o, "s", "s").is_err());
    }
}
