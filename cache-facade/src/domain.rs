//! Argument checks for the cache contract.
//!
//! Keys and values arrive as dynamic [`Value`]s and must be strings. Batch
//! checks walk the whole input before anything is forwarded, so a rejected
//! batch never reaches the backend.

use serde_json::Value;
use shared::{Error, Result};

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn key(key: &Value) -> Result<&str> {
    key.as_str().ok_or_else(|| {
        Error::invalid_argument(format!("key must be a string, got {}", kind_of(key)))
    })
}

pub fn key_value<'a>(key: &'a Value, value: &'a Value) -> Result<(&'a str, &'a str)> {
    match (key.as_str(), value.as_str()) {
        (Some(k), Some(v)) => Ok((k, v)),
        _ => Err(Error::invalid_argument(format!(
            "key and value must be strings, got {} and {}",
            kind_of(key),
            kind_of(value)
        ))),
    }
}

pub fn keys(keys: &[Value]) -> Result<Vec<&str>> {
    keys.iter()
        .enumerate()
        .map(|(i, k)| {
            k.as_str().ok_or_else(|| {
                Error::invalid_argument(format!(
                    "each key in keys must be a string, got {} at index {i}",
                    kind_of(k)
                ))
            })
        })
        .collect()
}

pub fn entries(entries: &[(Value, Value)]) -> Result<Vec<(&str, &str)>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (k, v))| match (k.as_str(), v.as_str()) {
            (Some(k), Some(v)) => Ok((k, v)),
            _ => Err(Error::invalid_argument(format!(
                "keys and values must be strings, got {} => {} at index {i}",
                kind_of(k),
                kind_of(v)
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_accepts_strings_only() {
        assert_eq!(key(&json!("user:1")).unwrap(), "user:1");
        assert_eq!(key(&json!("")).unwrap(), "");

        for bad in [json!(null), json!(7), json!(true), json!(["a"]), json!({"a": 1})] {
            let err = key(&bad).unwrap_err();
            assert!(err.is_invalid_argument(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_key_value_rejects_either_side() {
        assert_eq!(key_value(&json!("k"), &json!("v")).unwrap(), ("k", "v"));
        assert!(key_value(&json!(1), &json!("v")).is_err());

        let err = key_value(&json!("k"), &json!(1.5)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: key and value must be strings, got string and number"
        );
    }

    #[test]
    fn test_keys_reports_offending_index() {
        let err = keys(&[json!("a"), json!("b"), json!(3)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: each key in keys must be a string, got number at index 2"
        );

        assert_eq!(keys(&[json!("a"), json!("b")]).unwrap(), vec!["a", "b"]);
        assert!(keys(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_entries_checks_values_too() {
        let input = [(json!("a"), json!("1")), (json!("b"), json!(""))];
        let ok = entries(&input).unwrap();
        assert_eq!(ok, vec![("a", "1"), ("b", "")]);

        let err = entries(&[(json!("a"), json!("1")), (json!("b"), json!(null))]).unwrap_err();
        assert!(err.to_string().ends_with("string => null at index 1"));
    }
}
