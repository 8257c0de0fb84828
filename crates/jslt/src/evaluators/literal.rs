//! Literal values: strings, numbers, `true`, `false` and `null`.

use super::LITERAL_PRIORITY;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::scope::Scope;
use crate::types::{EvaluatorDefinition, ExprKind};
use crate::validate::CheckCtx;
use crate::value::number_value;
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?(0|[1-9]\d*)(\.\d+)?([eE][+-]?\d+)?$").unwrap()
    })
}

/// A leading digit and nothing a number could not contain. Anything else,
/// such as `5 $x`, is left for the other evaluators to claim.
fn looks_numeric(expr: &str) -> bool {
    let digits = expr.strip_prefix('-').unwrap_or(expr);
    digits.starts_with(|c: char| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

fn recognize(expr: &str) -> bool {
    expr.starts_with(['"', '\''])
        || looks_numeric(expr)
        || matches!(expr, "true" | "false" | "null")
}

/// Byte offset just past the quote closing the string opened at offset 0.
fn string_end(expr: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (pos, c) in expr.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(pos + c.len_utf8());
        }
    }
    None
}

/// Parses a complete quoted string literal, honoring backslash escapes.
///
/// Single-quoted strings are rewritten into JSON form first, so both quote
/// styles share JSON's escape rules.
pub fn parse_string(expr: &str) -> Result<String, EvalError> {
    let quote = match expr.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return Err(EvalError::syntax(expr)),
    };
    let end = string_end(expr, quote).ok_or_else(|| EvalError::UnterminatedString {
        literal: expr.to_string(),
    })?;
    if end != expr.len() {
        return Err(EvalError::syntax(expr));
    }
    let json = if quote == '"' {
        expr.to_string()
    } else {
        let body = &expr[1..expr.len() - 1];
        format!("\"{}\"", body.replace("\\'", "'").replace('"', "\\\""))
    };
    serde_json::from_str(&json).map_err(|_| EvalError::invalid("string", expr))
}

/// Parses JSON number text, normalizing integral values.
///
/// Text outside JSON's number grammar, and magnitudes that overflow an
/// `f64`, are malformed.
pub fn parse_number(expr: &str) -> Result<Value, EvalError> {
    let malformed = || EvalError::MalformedNumber {
        literal: expr.to_string(),
    };
    if !number_regex().is_match(expr) {
        return Err(malformed());
    }
    if !expr.contains(['.', 'e', 'E']) {
        if let Ok(n) = expr.parse::<i64>() {
            return Ok(Value::Number(Number::from(n)));
        }
    }
    let n = expr.parse::<f64>().map_err(|_| malformed())?;
    number_value(n).map_err(|_| malformed())
}

/// Converts literal text to a value.
pub fn parse_literal(expr: &str) -> Result<Value, EvalError> {
    match expr {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        "null" => Ok(Value::Null),
        _ if expr.starts_with(['"', '\'']) => parse_string(expr).map(Value::String),
        _ if looks_numeric(expr) => parse_number(expr),
        _ => Err(EvalError::syntax(expr)),
    }
}

fn eval(expr: &str, _input: &Value, _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    parse_literal(expr)
}

fn check(expr: &str, cx: &mut CheckCtx<'_>, _scope: &Scope<'_>) {
    if let Err(e) = parse_literal(expr) {
        cx.report(e);
    }
}

pub fn definition() -> EvaluatorDefinition {
    EvaluatorDefinition {
        name: "literal",
        priority: LITERAL_PRIORITY,
        recognize,
        kind: |_| ExprKind::Literal,
        eval_fn: eval,
        check_fn: Some(check),
    }
}
