//! Primitive type checkers.
//!
//! Transport values (headers, query string, path parameters, CSV cells) are
//! untyped strings; JSON bodies may also carry native numbers, booleans,
//! lists and objects. Each checker accepts both spellings where that makes
//! sense.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use validator::ValidateEmail;

use super::rules::FieldType;
use crate::types::is_object_id;

/// Whether `value` is valid for `field_type`.
pub fn check_type(field_type: FieldType, value: &Value) -> bool {
    match field_type {
        FieldType::String => value.as_str().is_some_and(|s| !s.trim().is_empty()),
        FieldType::Integer => as_integer(value).is_some(),
        FieldType::Number => as_number(value).is_some(),
        FieldType::Boolean => match value {
            Value::Bool(_) => true,
            Value::String(s) => s == "true" || s == "false",
            _ => false,
        },
        FieldType::Date => value.as_str().is_some_and(is_iso_date),
        FieldType::Email => value.as_str().is_some_and(|s| s.to_owned().validate_email()),
        FieldType::Identifier => value.as_str().is_some_and(is_object_id),
        FieldType::Array => value.is_array(),
        FieldType::Object => value.is_object(),
    }
}

/// Parse an integer written in plain decimal notation with no fractional part.
///
/// `"5"` and `"5.0"` yield 5; `"5.5"`, `"1e2"`, `"abc"` and `""` yield `None`.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if !is_decimal_literal(raw) {
        return None;
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let float = parse_number(raw)?;
    integral(float)
}

/// Optional sign, digits, then optionally `.` and more digits.
fn is_decimal_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.is_none_or(all_digits)
}

/// Parse a finite floating-point number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Integer view of a JSON value (native or textual).
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => parse_integer(s),
        _ => None,
    }
}

/// Numeric view of a JSON value (native or textual).
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// ISO-8601 date-time, naive date-time or calendar date.
pub fn is_iso_date(raw: &str) -> bool {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw).is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

fn integral(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64).then_some(n as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers() {
        for ok in [json!("5"), json!(5), json!("-3"), json!("5.0"), json!(7.0)] {
            assert!(check_type(FieldType::Integer, &ok), "{ok} should be an integer");
        }
        for bad in [json!("5.5"), json!("abc"), json!(""), json!(5.5), json!(true), json!(null)] {
            assert!(!check_type(FieldType::Integer, &bad), "{bad} should not be an integer");
        }
    }

    #[test]
    fn numbers() {
        assert!(check_type(FieldType::Number, &json!("5.5")));
        assert!(check_type(FieldType::Number, &json!(1e3)));
        assert!(!check_type(FieldType::Number, &json!("NaN")));
        assert!(!check_type(FieldType::Number, &json!("inf")));
        assert!(!check_type(FieldType::Number, &json!("")));
    }

    #[test]
    fn strings_must_not_be_blank() {
        assert!(check_type(FieldType::String, &json!("Juan")));
        assert!(!check_type(FieldType::String, &json!("   ")));
        assert!(!check_type(FieldType::String, &json!(12)));
    }

    #[test]
    fn booleans() {
        assert!(check_type(FieldType::Boolean, &json!(true)));
        assert!(check_type(FieldType::Boolean, &json!("false")));
        assert!(!check_type(FieldType::Boolean, &json!("yes")));
        assert!(!check_type(FieldType::Boolean, &json!(1)));
    }

    #[test]
    fn dates() {
        assert!(check_type(FieldType::Date, &json!("2024-03-01T10:00:00Z")));
        assert!(check_type(FieldType::Date, &json!("2024-03-01T10:00:00.250-03:00")));
        assert!(check_type(FieldType::Date, &json!("2024-03-01T10:00:00")));
        assert!(check_type(FieldType::Date, &json!("2024-03-01")));
        assert!(!check_type(FieldType::Date, &json!("not-a-date")));
        assert!(!check_type(FieldType::Date, &json!("2024-13-01")));
    }

    #[test]
    fn emails() {
        assert!(check_type(FieldType::Email, &json!("alumno@fi.uba.ar")));
        assert!(!check_type(FieldType::Email, &json!("alumno.fi.uba.ar")));
    }

    #[test]
    fn identifiers() {
        assert!(check_type(FieldType::Identifier, &json!("5f1a2b3c4d5e6f7081929394")));
        assert!(!check_type(FieldType::Identifier, &json!("5f1a2b3c4d5e6f708192939")));
        assert!(!check_type(FieldType::Identifier, &json!("5f1a2b3c4d5e6f708192939g")));
    }

    #[test]
    fn structured_values() {
        assert!(check_type(FieldType::Array, &json!([])));
        assert!(!check_type(FieldType::Array, &json!("[]")));
        assert!(check_type(FieldType::Object, &json!({})));
        assert!(!check_type(FieldType::Object, &json!(null)));
    }

    #[test]
    fn parse_integer_trims() {
        assert_eq!(parse_integer(" 42 "), Some(42));
        assert_eq!(parse_integer("40123456"), Some(40_123_456));
        assert_eq!(parse_integer("+7"), Some(7));
        assert_eq!(parse_integer("-3.0"), Some(-3));
        assert_eq!(parse_integer("4.2"), None);
    }

    #[test]
    fn parse_integer_rejects_scientific_and_partial_notation() {
        for raw in ["1e2", "1e7", "4E1", "0x1F", ".5", "5.", "1_000", "--1", "inf", "NaN"] {
            assert_eq!(parse_integer(raw), None, "{raw} should not be an integer");
        }
        assert!(!check_type(FieldType::Integer, &json!("1e7")));
    }
}
