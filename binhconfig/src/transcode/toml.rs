//! TOML transcoding: convert between hconfig values and TOML text.
//!
//! Mapping from TOML to hconfig:
//!   - TOML string          -> Value::String
//!   - TOML integer/float   -> Value::Number
//!   - TOML boolean         -> Value::Bool
//!   - TOML array           -> Value::Array
//!   - TOML table           -> Value::Object
//!   - TOML array of tables -> Value::Array of Value::Object
//!   - TOML datetime        -> Value::String (ISO 8601 representation)
//!
//! Mapping from hconfig to TOML:
//!   - Value::Null          -> error (TOML has no null)
//!   - Value::Number        -> TOML integer when integral, otherwise float
//!   - Value::Object        -> TOML table
//!   - Value::Array         -> TOML array of tables when every item is an
//!                             object, otherwise an inline array
//!
//! Lossy edges:
//!   - TOML has no null type; hconfig null values cause an error. Conf
//!     sections without a name carry `name null`, so they need a name to
//!     transcode.
//!   - TOML datetimes become hconfig strings.
//!   - TOML requires the top-level value to be a table; non-table values error.

use super::as_integer;
use anyhow::{anyhow, bail, Context, Result};
use hconfig::{Object, Value};
use toml_edit::DocumentMut;

/// Decode a TOML string into an hconfig Value.
pub fn decode(input: &str) -> Result<Value> {
    let doc: DocumentMut = input
        .parse::<DocumentMut>()
        .context("TOML parse error")?;
    Ok(toml_table_to_value(doc.as_table()))
}

/// Encode an hconfig Value as a TOML string.
pub fn encode(value: &Value) -> Result<String> {
    let Value::Object(obj) = value else {
        bail!("TOML requires the top-level value to be a table/object");
    };
    let mut doc = DocumentMut::new();
    for (key, value) in obj {
        doc[key.as_str()] = value_to_toml(value)?;
    }
    Ok(doc.to_string())
}

fn toml_table_to_value(table: &toml_edit::Table) -> Value {
    let mut obj = Object::new();
    for (key, item) in table.iter() {
        obj.insert(key.to_string(), toml_item_to_value(item));
    }
    Value::Object(obj)
}

fn toml_item_to_value(item: &toml_edit::Item) -> Value {
    match item {
        toml_edit::Item::Value(v) => toml_value_to_hconfig(v),
        toml_edit::Item::Table(t) => toml_table_to_value(t),
        toml_edit::Item::ArrayOfTables(arr) => {
            Value::Array(arr.iter().map(toml_table_to_value).collect())
        }
        toml_edit::Item::None => Value::Null,
    }
}

fn toml_value_to_hconfig(v: &toml_edit::Value) -> Value {
    match v {
        toml_edit::Value::String(s) => Value::String(s.value().clone()),
        toml_edit::Value::Integer(i) => Value::Number(*i.value() as f64),
        toml_edit::Value::Float(f) => Value::Number(*f.value()),
        toml_edit::Value::Boolean(b) => Value::Bool(*b.value()),
        toml_edit::Value::Datetime(dt) => Value::String(dt.value().to_string()),
        toml_edit::Value::Array(arr) => Value::Array(arr.iter().map(toml_value_to_hconfig).collect()),
        toml_edit::Value::InlineTable(table) => {
            let mut obj = Object::new();
            for (key, val) in table.iter() {
                obj.insert(key.to_string(), toml_value_to_hconfig(val));
            }
            Value::Object(obj)
        }
    }
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Item> {
    match value {
        Value::Object(obj) => {
            let mut table = toml_edit::Table::new();
            for (k, v) in obj {
                table.insert(k.as_str(), value_to_toml(v)?);
            }
            Ok(toml_edit::Item::Table(table))
        }
        Value::Array(arr) if !arr.is_empty() && arr.iter().all(|v| v.as_object().is_some()) => {
            let mut tables = toml_edit::ArrayOfTables::new();
            for v in arr {
                if let toml_edit::Item::Table(table) = value_to_toml(v)? {
                    tables.push(table);
                }
            }
            Ok(toml_edit::Item::ArrayOfTables(tables))
        }
        other => Ok(toml_edit::Item::Value(value_to_inline(other)?)),
    }
}

fn value_to_inline(value: &Value) -> Result<toml_edit::Value> {
    match value {
        Value::Null => Err(anyhow!("TOML has no null type")),
        Value::Bool(b) => Ok(toml_edit::Value::from(*b)),
        Value::Number(n) => match as_integer(*n) {
            Some(i) => Ok(toml_edit::Value::from(i)),
            None => Ok(toml_edit::Value::from(*n)),
        },
        Value::String(s) => Ok(toml_edit::Value::from(s.as_str())),
        Value::Array(arr) => {
            let mut toml_arr = toml_edit::Array::new();
            for v in arr {
                toml_arr.push(value_to_inline(v)?);
            }
            Ok(toml_edit::Value::Array(toml_arr))
        }
        Value::Object(obj) => {
            let mut inline = toml_edit::InlineTable::new();
            for (k, v) in obj {
                inline.insert(k.as_str(), value_to_inline(v)?);
            }
            Ok(toml_edit::Value::InlineTable(inline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_become_array_of_tables() {
        let conf = hconfig::parse_conf(
            "port 8080\nvhost a.example.com { root /var/www/a }\nvhost b.example.com { root /var/www/b }",
            None,
        )
        .unwrap();
        let value = Value::Object(conf);
        let text = encode(&value).unwrap();
        assert!(text.starts_with("port = 8080\n"));
        assert_eq!(text.matches("[[vhost]]").count(), 2);
        assert!(text.contains("name = \"a.example.com\""));
        assert_eq!(decode(&text).unwrap(), value);
    }

    #[test]
    fn test_null_is_rejected() {
        let value = hconfig::parse_value("a null", false).unwrap();
        assert!(encode(&value).is_err());
        assert!(encode(&Value::from(10)).is_err());
    }

    #[test]
    fn test_decode_scalars() {
        let value = decode("a = 1\nb = 2.5\nc = \"x\"\nd = [true, false]\n").unwrap();
        assert_eq!(value.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(value.get("b"), Some(&Value::Number(2.5)));
        assert_eq!(value.get("c"), Some(&Value::from("x")));
        assert_eq!(
            value.get("d"),
            Some(&Value::Array(vec![Value::Bool(true), Value::Bool(false)]))
        );
    }
}
