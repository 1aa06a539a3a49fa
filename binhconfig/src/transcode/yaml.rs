//! YAML transcoding: convert between hconfig values and YAML text.
//!
//! Mapping from YAML to hconfig:
//!   - YAML null          -> Value::Null
//!   - YAML bool          -> Value::Bool
//!   - YAML integer/float -> Value::Number
//!   - YAML string        -> Value::String
//!   - YAML sequence      -> Value::Array
//!   - YAML mapping       -> Value::Object (scalar keys, written as text)
//!   - YAML tagged value  -> the inner value, tag dropped
//!
//! Mapping from hconfig to YAML:
//!   - Value::Number      -> YAML integer when integral, otherwise float
//!   - everything else maps one to one; mapping order follows the object

use super::as_integer;
use anyhow::{anyhow, Context, Result};
use hconfig::{Object, Value};

/// Decode a YAML string into an hconfig Value.
pub fn decode(input: &str) -> Result<Value> {
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(input).context("YAML parse error")?;
    yaml_to_value(&yaml_value)
}

/// Encode an hconfig Value as a YAML string.
pub fn encode(value: &Value) -> Result<String> {
    let yaml_value = value_to_yaml(value);
    serde_yaml::to_string(&yaml_value).context("YAML encode error")
}

fn yaml_to_value(yaml: &serde_yaml::Value) -> Result<Value> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| anyhow!("Unsupported YAML number: {:?}", n)),
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>> = seq.iter().map(yaml_to_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut obj = Object::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => format!("{}", n),
                    serde_yaml::Value::Bool(b) => format!("{}", b),
                    serde_yaml::Value::Null => "null".to_string(),
                    _ => return Err(anyhow!("Unsupported YAML mapping key type: {:?}", k)),
                };
                obj.insert(key, yaml_to_value(v)?);
            }
            Ok(Value::Object(obj))
        }
        serde_yaml::Value::Tagged(tagged) => {
            log::debug!("dropping YAML tag {}", tagged.tag);
            yaml_to_value(&tagged.value)
        }
    }
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Number(n) => match as_integer(*n) {
            Some(i) => serde_yaml::Value::Number(serde_yaml::Number::from(i)),
            None => serde_yaml::Value::Number(serde_yaml::Number::from(*n)),
        },
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Array(arr) => serde_yaml::Value::Sequence(arr.iter().map(value_to_yaml).collect()),
        Value::Object(obj) => {
            let mut map = serde_yaml::Mapping::new();
            for (k, v) in obj {
                map.insert(serde_yaml::Value::String(k.clone()), value_to_yaml(v));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_integral_numbers() {
        let value = hconfig::parse_value("port 8080 ratio 0.5 hosts [a b]", false).unwrap();
        assert_eq!(
            encode(&value).unwrap(),
            "port: 8080\nratio: 0.5\nhosts:\n- a\n- b\n"
        );
    }

    #[test]
    fn test_decode_mapping() {
        let value = decode("b: 1\na: [x, 2.5]\n3: null\n").unwrap();
        let obj = value.as_object().unwrap();
        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "3"]);
        assert_eq!(
            obj["a"],
            Value::Array(vec![Value::from("x"), Value::Number(2.5)])
        );
    }
}
