//! CBOR transcoding: convert between hconfig values and CBOR binary data.
//!
//! Mapping from CBOR to hconfig:
//!   - CBOR null                  -> Value::Null
//!   - CBOR bool                  -> Value::Bool
//!   - CBOR unsigned/negative int -> Value::Number
//!   - CBOR float (16/32/64)      -> Value::Number (promoted to f64)
//!   - CBOR text string           -> Value::String
//!   - CBOR array (det/indet)     -> Value::Array
//!   - CBOR map (det/indet)       -> Value::Object (text string keys only)
//!   - CBOR byte string, tag, undefined -> error (no hconfig equivalent)
//!
//! Mapping from hconfig to CBOR:
//!   - Value::Null    -> CBOR null (simple value 22)
//!   - Value::Bool    -> CBOR bool (simple values 20/21)
//!   - Value::Number  -> CBOR integer (smallest encoding) when integral and
//!                       within i64, otherwise CBOR float64
//!   - Value::String  -> CBOR text string (determinate length)
//!   - Value::Array   -> CBOR array (determinate length)
//!   - Value::Object  -> CBOR map (determinate length, text string keys, in
//!                       object order)

use super::as_integer;
use anyhow::{anyhow, Context, Result};
use ciborium::value::Value as CborValue;
use hconfig::{Object, Value};

// ---------------------------------------------------------------------------
// Decode (CBOR -> hconfig)
// ---------------------------------------------------------------------------

/// Decode CBOR bytes into an hconfig Value.
pub fn decode(input: &[u8]) -> Result<Value> {
    let cbor_value: CborValue = ciborium::de::from_reader(input).context("CBOR decode error")?;
    cbor_to_value(&cbor_value)
}

fn cbor_to_value(cbor: &CborValue) -> Result<Value> {
    match cbor {
        CborValue::Null => Ok(Value::Null),
        CborValue::Bool(b) => Ok(Value::Bool(*b)),
        CborValue::Integer(i) => {
            let n: i128 = (*i).into();
            Ok(Value::Number(n as f64))
        }
        CborValue::Float(f) => Ok(Value::Number(*f)),
        CborValue::Text(s) => Ok(Value::String(s.clone())),
        CborValue::Array(arr) => {
            let items: Result<Vec<Value>> = arr.iter().map(cbor_to_value).collect();
            Ok(Value::Array(items?))
        }
        CborValue::Map(pairs) => {
            let mut obj = Object::new();
            for (k, v) in pairs {
                let key = match k {
                    CborValue::Text(s) => s.clone(),
                    _ => return Err(anyhow!("CBOR map key must be a text string, got: {:?}", k)),
                };
                obj.insert(key, cbor_to_value(v)?);
            }
            Ok(Value::Object(obj))
        }
        CborValue::Bytes(_) => Err(anyhow!("CBOR byte string has no hconfig equivalent")),
        CborValue::Tag(tag, _) => Err(anyhow!(
            "CBOR tagged value (tag {}) has no hconfig equivalent",
            tag
        )),
        _ => Err(anyhow!("CBOR value {:?} has no hconfig equivalent", cbor)),
    }
}

// ---------------------------------------------------------------------------
// Encode (hconfig -> CBOR)
//
// Written directly rather than through ciborium's Value type so that
// non-integral numbers always stay float64 (major type 7, additional info 27).
// ---------------------------------------------------------------------------

/// Encode an hconfig Value as CBOR bytes.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(&mut buf, value);
    buf
}

fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.push(0xf6),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Number(n) => match as_integer(*n) {
            Some(i) => write_integer(buf, i),
            None => {
                buf.push(0xfb);
                buf.extend_from_slice(&n.to_be_bytes());
            }
        },
        Value::String(s) => write_text(buf, s),
        Value::Array(arr) => {
            write_type_and_length(buf, 4, arr.len() as u64); // major 4 = array
            for item in arr {
                write_value(buf, item);
            }
        }
        Value::Object(obj) => {
            write_type_and_length(buf, 5, obj.len() as u64); // major 5 = map
            for (k, v) in obj {
                write_text(buf, k);
                write_value(buf, v);
            }
        }
    }
}

fn write_text(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    write_type_and_length(buf, 3, bytes.len() as u64); // major 3 = text string
    buf.extend_from_slice(bytes);
}

/// Write a CBOR initial byte for the given major type and argument value,
/// plus optional following bytes for the argument:
///   0-23:    argument in the low 5 bits (1 byte total)
///   24:      1-byte argument follows
///   25:      2-byte argument follows
///   26:      4-byte argument follows
///   27:      8-byte argument follows
fn write_type_and_length(buf: &mut Vec<u8>, major: u8, val: u64) {
    let high = major << 5;
    match val {
        0..=23 => {
            buf.push(high | val as u8);
        }
        24..=0xff => {
            buf.push(high | 24);
            buf.push(val as u8);
        }
        0x100..=0xffff => {
            buf.push(high | 25);
            buf.extend_from_slice(&(val as u16).to_be_bytes());
        }
        0x10000..=0xffff_ffff => {
            buf.push(high | 26);
            buf.extend_from_slice(&(val as u32).to_be_bytes());
        }
        _ => {
            buf.push(high | 27);
            buf.extend_from_slice(&val.to_be_bytes());
        }
    }
}

/// Major 0 encodes n directly; major 1 encodes -1 - n.
fn write_integer(buf: &mut Vec<u8>, n: i64) {
    if n < 0 {
        write_type_and_length(buf, 1, (-1 - n) as u64);
    } else {
        write_type_and_length(buf, 0, n as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_bytes() {
        let value = hconfig::parse_value("a 10 b -1 c 0.5", false).unwrap();
        let mut expected = vec![0xa3, 0x61, b'a', 0x0a, 0x61, b'b', 0x20, 0x61, b'c', 0xfb];
        expected.extend_from_slice(&0.5f64.to_be_bytes());
        assert_eq!(encode(&value), expected);
    }

    #[test]
    fn test_wide_integers() {
        let mut buf = Vec::new();
        write_integer(&mut buf, 8080);
        assert_eq!(buf, [0x19, 0x1f, 0x90]);
        buf.clear();
        write_integer(&mut buf, -500);
        assert_eq!(buf, [0x39, 0x01, 0xf3]);
    }

    #[test]
    fn test_decode_roundtrip_conf() {
        let conf = hconfig::parse_conf("general { port 8080 index [.html .htm] }", None).unwrap();
        let value = Value::Object(conf);
        assert_eq!(decode(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn test_decode_rejects_bytes() {
        assert!(decode(&[0x41, 0x00]).is_err());
    }
}
