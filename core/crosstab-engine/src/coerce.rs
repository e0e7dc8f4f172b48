//! FILENAME: core/crosstab-engine/src/coerce.rs
//! Numeric coercion with fallback, and fixed-point rendering of statistics.

use crate::error::CrossTabError;
use crate::record::{number_to_string, Value};

/// Largest decimal place count accepted by [`to_fixed`].
pub const MAX_FIXED_DIGITS: f64 = 100.0;

/// Coerces a record value to a number, substituting `default` when it has
/// no numeric reading.
pub fn to_number_or(value: &Value, default: f64) -> f64 {
    let n = match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => *n,
        Value::Text(s) => return text_to_number_or(s, default),
        Value::Nested(_) => return text_to_number_or(&value.canonical_key(), default),
    };
    if n.is_nan() {
        default
    } else {
        n
    }
}

/// Parses text as a number. Blank text reads as `0`; hex/octal/binary
/// integer literals and `Infinity` are accepted; anything else that is not
/// a plain decimal literal yields `default`.
pub fn text_to_number_or(text: &str, default: f64) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(n) = parse_radix_literal(s) {
        return n;
    }

    // `f64::from_str` also accepts "inf"/"nan" spellings, which are not numbers here.
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return default;
    }

    match s.parse::<f64>() {
        Ok(n) if !n.is_nan() => n,
        _ => default,
    }
}

fn parse_radix_literal(s: &str) -> Option<f64> {
    let (radix, digits) = match s.get(..2) {
        Some("0x") | Some("0X") => (16, &s[2..]),
        Some("0o") | Some("0O") => (8, &s[2..]),
        Some("0b") | Some("0B") => (2, &s[2..]),
        _ => return None,
    };
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, radix).ok().map(|n| n as f64)
}

/// Renders `n` with a fixed number of decimals. `digits` is truncated toward
/// zero and must lie in `0..=100`.
///
/// The magnitude is rounded half away from zero on its exact binary value, so
/// `2.5` gives `"3"` and `0.125` at two places gives `"0.13"`, while `1.005`
/// (stored just below the tie) gives `"1.00"`. Negative input keeps its sign
/// even when it rounds to zero; only `-0` itself renders unsigned.
pub fn to_fixed(n: f64, digits: f64) -> Result<String, CrossTabError> {
    let places = if digits.is_nan() { 0.0 } else { digits.trunc() };
    if !(0.0..=MAX_FIXED_DIGITS).contains(&places) {
        return Err(CrossTabError::InvalidDigits(digits));
    }
    if !n.is_finite() {
        return Ok(number_to_string(n));
    }
    let magnitude = round_half_up(n.abs(), places as usize);
    if n < 0.0 {
        Ok(format!("-{}", magnitude))
    } else {
        Ok(magnitude)
    }
}

/// Fractional digits needed to write any finite `f64` exactly.
const EXACT_FRACTION_DIGITS: usize = 1074;

fn round_half_up(magnitude: f64, places: usize) -> String {
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, magnitude);
    let (int_part, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.extend(fraction.bytes().take(places));
    // The expansion is exact: a first dropped digit of 5 or more is at or past the tie.
    if fraction.as_bytes().get(places).map_or(false, |&d| d >= b'5') {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - places;
    let mut out = String::with_capacity(digits.len() + 1);
    out.extend(digits[..split].iter().map(|&d| d as char));
    if places > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|&d| d as char));
    }
    out
}
