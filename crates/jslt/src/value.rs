//! Value helpers shared by the evaluators and built-in functions.

use crate::error::EvalError;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

// ----------------------------------------------------------------- Type helpers

/// Returns the type name of a value, as used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns the numeric value of a `Number`, or `None` for every other type.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

// ----------------------------------------------------------------- Number helpers

/// Builds a normalized number value.
///
/// Integral results within the exactly-representable range are stored as
/// integers so that `2 + 3` prints as `5` rather than `5.0`. NaN and the
/// infinities have no JSON form and are rejected.
pub fn number_value(n: f64) -> Result<Value, EvalError> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(Value::Number(Number::from(n as i64)));
    }
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| EvalError::NumberOutOfRange {
            value: n.to_string(),
        })
}

/// Canonical decimal text of a number.
pub fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

// ----------------------------------------------------------------- Conversion

/// Converts any value to its string form.
///
/// Strings are returned unquoted; arrays and objects use their JSON text.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

// -------------------------------------------------------------- Comparison helpers

/// Structural equality where numbers compare by numeric value.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, xv)| ym.get(k).is_some_and(|yv| values_equal(xv, yv)))
        }
        _ => a == b,
    }
}

/// Orders two values of the same comparable type.
///
/// Only number/number and string/string pairs are ordered; every other
/// pairing returns `None`.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
