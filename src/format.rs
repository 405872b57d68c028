//! Per-type text forms of fields.
//!
//! Formatting and parsing of a single field, independent of the `[N]` header
//! and the delimiter. Both [`encode`](crate::encode)/[`decode`](crate::decode)
//! and the serde layer go through these functions, so the explicit-shape and
//! the derive-based paths accept and emit exactly the same text.

use crate::options::{DELIMITER, HEADER_CLOSE, HEADER_OPEN, MAX_FLOAT_PRECISION};
use crate::{Error, Field, FieldType, Result};

pub(crate) const TRUE: &str = "T";
pub(crate) const FALSE: &str = "F";

/// Appends the text form of `field` to `out`.
pub(crate) fn write_field(
    out: &mut String,
    index: usize,
    field: &Field,
    precision: usize,
) -> Result<()> {
    match field {
        Field::Float(f) => write_float(out, index, *f, precision),
        Field::Integer(i) => {
            out.push_str(&i.to_string());
            Ok(())
        }
        Field::Boolean(b) => {
            out.push_str(if *b { TRUE } else { FALSE });
            Ok(())
        }
        Field::Text(s) => write_text(out, index, s),
    }
}

pub(crate) fn write_float(
    out: &mut String,
    index: usize,
    value: f64,
    precision: usize,
) -> Result<()> {
    match format_float(value, precision) {
        Some(text) => {
            out.push_str(&text);
            Ok(())
        }
        None => Err(Error::shape_mismatch(format!(
            "field {index}: float {value} has no fixed-point form"
        ))),
    }
}

pub(crate) fn write_text(out: &mut String, index: usize, text: &str) -> Result<()> {
    if let Some(ch) = text
        .chars()
        .find(|&c| c == DELIMITER || c == HEADER_OPEN || c == HEADER_CLOSE)
    {
        return Err(Error::shape_mismatch(format!(
            "field {index}: text {text:?} contains reserved character '{ch}'"
        )));
    }
    out.push_str(text);
    Ok(())
}

/// Renders a finite float in fixed-point with `precision` fractional digits,
/// rounding half away from zero. Returns `None` for NaN and infinities.
///
/// Precision is capped at [`MAX_FLOAT_PRECISION`]; past that every finite
/// `f64` is already exact.
pub(crate) fn format_float(value: f64, precision: usize) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let precision = precision.min(MAX_FLOAT_PRECISION);
    let magnitude = value.abs();
    let mut text = if fractional_bits(magnitude) as usize == precision.saturating_add(1) {
        // Exact tie: the expansion stops one digit past `precision` with a 5.
        let exact = format!("{:.*}", precision + 1, magnitude);
        let mut kept = exact[..exact.len() - 1].to_string();
        if kept.ends_with('.') {
            kept.pop();
        }
        increment_decimal(&kept)
    } else {
        format!("{:.*}", precision, magnitude)
    };

    let is_zero = text.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !is_zero {
        text.insert(0, '-');
    }
    Some(text)
}

/// Number of binary digits after the point in the exact value of `value`.
fn fractional_bits(value: f64) -> u32 {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    if mantissa == 0 {
        return 0;
    }
    let exponent = exponent + mantissa.trailing_zeros() as i32;
    if exponent >= 0 {
        0
    } else {
        exponent.unsigned_abs()
    }
}

/// Adds one unit in the last place to an unsigned decimal string.
fn increment_decimal(digits: &str) -> String {
    let mut chars: Vec<char> = digits.chars().collect();
    for i in (0..chars.len()).rev() {
        match chars[i] {
            '.' => continue,
            '9' => chars[i] = '0',
            d => {
                chars[i] = (d as u8 + 1) as char;
                return chars.into_iter().collect();
            }
        }
    }
    chars.insert(0, '1');
    chars.into_iter().collect()
}

/// Parses `text` according to `ty`. `precision` selects the float grammar,
/// see [`is_float_literal`].
pub(crate) fn parse_field(
    text: &str,
    ty: FieldType,
    index: usize,
    precision: usize,
) -> Result<Field> {
    match ty {
        FieldType::Float => parse_float(text, index, precision).map(Field::Float),
        FieldType::Integer => parse_integer(text, index).map(Field::Integer),
        FieldType::Boolean => parse_bool(text, index).map(Field::Boolean),
        FieldType::Text => Ok(Field::Text(text.to_string())),
    }
}

pub(crate) fn parse_float(text: &str, index: usize, precision: usize) -> Result<f64> {
    if !is_float_literal(text, precision) {
        return Err(Error::invalid_field(FieldType::Float, index, text));
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err(Error::invalid_field(FieldType::Float, index, text)),
    }
}

/// Parses a float field directly at single precision, so an `f32` encoded at
/// full precision reads back as the same `f32`.
pub(crate) fn parse_f32(text: &str, index: usize, precision: usize) -> Result<f32> {
    if !is_float_literal(text, precision) {
        return Err(Error::invalid_field(FieldType::Float, index, text));
    }
    match text.parse::<f32>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err(Error::invalid_field(FieldType::Float, index, text)),
    }
}

pub(crate) fn parse_integer(text: &str, index: usize) -> Result<i64> {
    if !is_integer_literal(text) {
        return Err(Error::invalid_field(FieldType::Integer, index, text));
    }
    text.parse::<i64>()
        .map_err(|_| Error::invalid_field(FieldType::Integer, index, text))
}

pub(crate) fn parse_bool(text: &str, index: usize) -> Result<bool> {
    match text {
        TRUE => Ok(true),
        FALSE => Ok(false),
        _ => Err(Error::invalid_field(FieldType::Boolean, index, text)),
    }
}

/// `-?digits`
pub(crate) fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `-?digits.digits`. With `precision` 0 the encoder writes no fractional
/// part, so bare `-?digits` is accepted as well.
pub(crate) fn is_float_literal(text: &str, precision: usize) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    match unsigned.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty()
                && !frac.is_empty()
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => {
            precision == 0
                && !unsigned.is_empty()
                && unsigned.bytes().all(|b| b.is_ascii_digit())
        }
    }
}
