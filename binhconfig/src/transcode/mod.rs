//! Conversions between hconfig values and the formats the library does not
//! speak itself.

pub mod cbor;
pub mod json;
pub mod toml;
pub mod yaml;

/// The number as an `i64` when it has no fractional part and fits.
///
/// hconfig keeps every number as `f64`; formats with a separate integer type
/// get integers wherever the value allows.
pub fn as_integer(n: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    if n.is_finite() && n.fract() == 0.0 && (-LIMIT..LIMIT).contains(&n) {
        Some(n as i64)
    } else {
        None
    }
}
