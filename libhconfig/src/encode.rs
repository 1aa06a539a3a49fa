//! Encode hconfig values to text.
//!
//! Two output formats live here: hconfig itself, written so that
//! [`parse_value`](crate::parse_value) reads it back to the same value, and
//! pretty-printed JSON. Both keep object keys in insertion order. YAML, TOML
//! and CBOR are handled by the `hconfig` command-line tool.

use crate::error::{ParseError, Result};
use crate::parser::parse_scalar_atom;
use crate::scanner::{is_structural, QuoteKind};
use crate::value::{Object, Value};

/// Output format for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// hconfig text. An object root is written as bare `key value` lines and
    /// reads back with `root_is_value == false`; any other root is a single
    /// value and reads back with `root_is_value == true`.
    Hcnf,
    /// JSON (standard)
    Json,
}

/// Encode a value to a string in the specified format.
pub fn encode(value: &Value, format: Format) -> Result<String> {
    match format {
        Format::Hcnf => match value {
            Value::Object(obj) => encode_hcnf_root(obj),
            other => encode_hcnf(other, 0),
        },
        Format::Json => encode_json(value, 0),
    }
}

// =============================================================================
// hconfig Encoder
// =============================================================================

fn encode_hcnf_root(obj: &Object) -> Result<String> {
    let mut lines = Vec::with_capacity(obj.len());
    for (k, v) in obj {
        lines.push(format!("{} {}", encode_hcnf_key(k)?, encode_hcnf(v, 0)?));
    }
    Ok(lines.join("\n"))
}

fn encode_hcnf(value: &Value, indent: usize) -> Result<String> {
    let pad = "  ".repeat(indent);
    let pad1 = "  ".repeat(indent + 1);

    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(true) => Ok("true".to_string()),
        Value::Bool(false) => Ok("false".to_string()),
        Value::Number(n) => encode_number(*n),
        Value::String(s) => encode_hcnf_string(s),
        Value::Array(arr) => {
            if arr.is_empty() {
                Ok("[]".to_string())
            } else if arr.iter().all(Value::is_scalar) {
                let items = arr
                    .iter()
                    .map(|v| encode_hcnf(v, 0))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("[{}]", items.join(" ")))
            } else {
                let mut items = Vec::with_capacity(arr.len());
                for v in arr {
                    items.push(format!("{}{}", pad1, encode_hcnf(v, indent + 1)?));
                }
                Ok(format!("[\n{}\n{}]", items.join("\n"), pad))
            }
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                return Ok("{}".to_string());
            }
            let mut items = Vec::with_capacity(obj.len());
            for (k, v) in obj {
                items.push(format!(
                    "{}{} {}",
                    pad1,
                    encode_hcnf_key(k)?,
                    encode_hcnf(v, indent + 1)?
                ));
            }
            Ok(format!("{{\n{}\n{}}}", items.join("\n"), pad))
        }
    }
}

fn encode_number(n: f64) -> Result<String> {
    if n.is_finite() {
        Ok(format!("{}", n))
    } else {
        Err(ParseError::Unencodable(format!("non-finite number {}", n)))
    }
}

/// Text the scanner would read back unchanged as one unquoted atom.
fn is_bare_text(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c == '"' || c == '\'')
        && !s
            .chars()
            .any(|c| c.is_whitespace() || is_structural(c) || c == '#')
}

fn encode_hcnf_key(key: &str) -> Result<String> {
    if is_bare_text(key) {
        Ok(key.to_string())
    } else {
        encode_hcnf_quoted(key)
    }
}

fn encode_hcnf_string(s: &str) -> Result<String> {
    // Bare text that sniffs as a keyword or number must stay quoted.
    if is_bare_text(s) && parse_scalar_atom(s, QuoteKind::Unquoted) == Value::String(s.into()) {
        Ok(s.to_string())
    } else {
        encode_hcnf_quoted(s)
    }
}

fn encode_hcnf_quoted(s: &str) -> Result<String> {
    if !s.contains("$(") {
        return Ok(encode_hcnf_double_quoted(s));
    }
    // Double quotes would expand the reference; single quotes cannot escape.
    if s.contains('\'') {
        return Err(ParseError::Unencodable(format!(
            "string {:?} containing both \"$(\" and a single quote",
            s
        )));
    }
    Ok(format!("'{}'", s))
}

fn encode_hcnf_double_quoted(s: &str) -> String {
    let mut result = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x0c' => result.push_str("\\f"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

// =============================================================================
// JSON Encoder
// =============================================================================

fn encode_json(value: &Value, indent: usize) -> Result<String> {
    let pad = "  ".repeat(indent);
    let pad1 = "  ".repeat(indent + 1);

    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(true) => Ok("true".to_string()),
        Value::Bool(false) => Ok("false".to_string()),
        Value::Number(n) => encode_number(*n),
        Value::String(s) => Ok(encode_json_string(s)),
        Value::Array(arr) => {
            if arr.is_empty() {
                return Ok("[]".to_string());
            }
            let mut items = Vec::with_capacity(arr.len());
            for v in arr {
                items.push(format!("{}{}", pad1, encode_json(v, indent + 1)?));
            }
            Ok(format!("[\n{}\n{}]", items.join(",\n"), pad))
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                return Ok("{}".to_string());
            }
            let mut items = Vec::with_capacity(obj.len());
            for (k, v) in obj {
                items.push(format!(
                    "{}{}: {}",
                    pad1,
                    encode_json_string(k),
                    encode_json(v, indent + 1)?
                ));
            }
            Ok(format!("{{\n{}\n{}}}", items.join(",\n"), pad))
        }
    }
}

fn encode_json_string(s: &str) -> String {
    let mut result = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}
