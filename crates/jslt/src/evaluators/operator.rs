//! Binary operators: comparisons and `+`.
//!
//! Comparisons bind looser than `+`, and both associate to the left, so the
//! expression is split at the last top-level comparison, or failing that at
//! the last top-level `+`.

use super::OPERATOR_PRIORITY;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::scanner::TopLevel;
use crate::scope::Scope;
use crate::types::{EvaluatorDefinition, ExprKind};
use crate::validate::CheckCtx;
use crate::value::{compare, number_value, to_text, type_name, values_equal};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
        }
    }
}

fn exponent_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?[eE]$").unwrap())
}

/// True when the `+` that follows `before` is a sign rather than an operator.
fn is_sign(before: &str) -> bool {
    let before = before.trim_end();
    if before.is_empty() || before.ends_with(['+', '=', '<', '>', '!', ',', ':', '(', '[']) {
        return true;
    }
    let token_start = before
        .trim_end_matches(|c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .len();
    exponent_regex().is_match(&before[token_start..])
}

/// Finds the operator to split `expr` at: `(offset, operator)`.
pub fn find_operator(expr: &str) -> Option<(usize, BinaryOp)> {
    let mut last_cmp = None;
    let mut last_add = None;
    let mut skip_until = 0;
    for (pos, c) in TopLevel::new(expr) {
        if pos < skip_until {
            continue;
        }
        let next_is_eq = expr[pos + c.len_utf8()..].starts_with('=');
        let op = match c {
            '=' if next_is_eq => Some(BinaryOp::Eq),
            '!' if next_is_eq => Some(BinaryOp::Ne),
            '<' if next_is_eq => Some(BinaryOp::Le),
            '>' if next_is_eq => Some(BinaryOp::Ge),
            '<' => Some(BinaryOp::Lt),
            '>' => Some(BinaryOp::Gt),
            '+' if !is_sign(&expr[..pos]) => Some(BinaryOp::Add),
            _ => None,
        };
        match op {
            Some(BinaryOp::Add) => last_add = Some((pos, BinaryOp::Add)),
            Some(op) => {
                skip_until = pos + op.symbol().len();
                last_cmp = Some((pos, op));
            }
            None => {}
        }
    }
    last_cmp.or(last_add)
}

/// Splits `expr` into `(left, operator, right)`.
pub fn split_binary(expr: &str) -> Result<(&str, BinaryOp, &str), EvalError> {
    let (pos, op) = find_operator(expr).ok_or_else(|| EvalError::syntax(expr))?;
    let left = expr[..pos].trim();
    let right = expr[pos + op.symbol().len()..].trim();
    if left.is_empty() || right.is_empty() {
        return Err(EvalError::invalid("operator", expr));
    }
    Ok((left, op, right))
}

fn ordering_error(left: &Value, right: &Value) -> EvalError {
    match left {
        Value::Number(_) => EvalError::type_error("number", type_name(right)),
        Value::String(_) => EvalError::type_error("string", type_name(right)),
        _ => EvalError::type_error("number or string", type_name(left)),
    }
}

/// Applies a binary operator to two evaluated operands.
pub fn apply(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let ordered = |accept: fn(Ordering) -> bool| {
        compare(left, right)
            .map(|ord| Value::Bool(accept(ord)))
            .ok_or_else(|| ordering_error(left, right))
    };
    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(left, right))),
        BinaryOp::Ne => Ok(Value::Bool(!values_equal(left, right))),
        BinaryOp::Lt => ordered(Ordering::is_lt),
        BinaryOp::Le => ordered(Ordering::is_le),
        BinaryOp::Gt => ordered(Ordering::is_gt),
        BinaryOp::Ge => ordered(Ordering::is_ge),
        BinaryOp::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => {
                let sum = a.as_f64().unwrap_or(0.0) + b.as_f64().unwrap_or(0.0);
                number_value(sum)
            }
            (Value::String(a), _) => Ok(Value::String(format!("{a}{}", to_text(right)))),
            (Value::Number(_), _) => Err(EvalError::type_error("number", type_name(right))),
            _ => Err(EvalError::type_error("number or string", type_name(left))),
        },
    }
}

fn recognize(expr: &str) -> bool {
    find_operator(expr).is_some()
}

fn eval(expr: &str, input: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let (left, op, right) = split_binary(expr)?;
    let left = ctx.eval(left, input)?;
    let right = ctx.eval(right, input)?;
    apply(op, &left, &right)
}

fn check(expr: &str, cx: &mut CheckCtx<'_>, scope: &Scope<'_>) {
    match split_binary(expr) {
        Ok((left, _, right)) => {
            cx.check(left, scope);
            cx.check(right, scope);
        }
        Err(e) => cx.report(e),
    }
}

pub fn definition() -> EvaluatorDefinition {
    EvaluatorDefinition {
        name: "operator",
        priority: OPERATOR_PRIORITY,
        recognize,
        kind: |_| ExprKind::BinaryOperation,
        eval_fn: eval,
        check_fn: Some(check),
    }
}
