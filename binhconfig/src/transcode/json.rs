//! JSON decoding: convert JSON text into hconfig values.
//!
//! Encoding goes through `hconfig::encode` with `Format::Json`. Decoding uses
//! `serde_json` with `preserve_order`, so object keys keep document order.

use anyhow::{anyhow, Context, Result};
use hconfig::{Object, Value};

/// Decode a JSON string into an hconfig Value.
pub fn decode(input: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(input).context("JSON parse error")?;
    json_to_value(&json)
}

fn json_to_value(json: &serde_json::Value) -> Result<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| anyhow!("Unsupported JSON number: {}", n)),
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(arr) => {
            let items: Result<Vec<Value>> = arr.iter().map(json_to_value).collect();
            Ok(Value::Array(items?))
        }
        serde_json::Value::Object(map) => {
            let mut obj = Object::new();
            for (k, v) in map {
                obj.insert(k.clone(), json_to_value(v)?);
            }
            Ok(Value::Object(obj))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_keeps_order() {
        let value = decode(r#"{"zeta": 1, "alpha": [true, null, "x"]}"#).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
        assert_eq!(value.get("zeta"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_decode_error() {
        assert!(decode("{").is_err());
    }
}
