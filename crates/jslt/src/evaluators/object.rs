//! Object construction: `{ let t = .a "key": expr, other: expr }`.
//!
//! Leading `let` declarations are evaluated in order into one frame that
//! every entry sees. Entries are evaluated in source order; a repeated key
//! keeps its first position and takes the later value.

use super::literal::parse_string;
use super::variable::parse_let;
use super::CONSTRUCTION_PRIORITY;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::scanner::{ident_len, is_enclosed, split_top_level, starts_with_keyword, TopLevel};
use crate::scope::Scope;
use crate::types::{EvaluatorDefinition, ExprKind};
use crate::validate::CheckCtx;
use serde_json::{Map, Value};

#[derive(Debug, PartialEq)]
pub struct ObjectParts<'a> {
    pub lets: Vec<(&'a str, &'a str)>,
    pub entries: Vec<(String, &'a str)>,
}

fn parse_key(key: &str, expr: &str) -> Result<String, EvalError> {
    if key.starts_with(['"', '\'']) {
        return parse_string(key);
    }
    if !key.is_empty() && ident_len(key) == key.len() {
        return Ok(key.to_string());
    }
    Err(EvalError::invalid("object key", expr))
}

fn parse_entry<'a>(entry: &'a str, expr: &str) -> Result<(String, &'a str), EvalError> {
    let colon = TopLevel::new(entry)
        .find(|&(_, c)| c == ':')
        .map(|(pos, _)| pos)
        .ok_or_else(|| EvalError::invalid("object", expr))?;
    let key = parse_key(entry[..colon].trim(), expr)?;
    let value = entry[colon + 1..].trim();
    if value.is_empty() {
        return Err(EvalError::invalid("object", expr));
    }
    Ok((key, value))
}

pub fn parse_object(expr: &str) -> Result<ObjectParts<'_>, EvalError> {
    let mut body = expr[1..expr.len() - 1].trim();
    let mut lets = Vec::new();
    while starts_with_keyword(body, "let") {
        let binding = parse_let(body)?;
        lets.push((binding.name, binding.value));
        body = binding.body.unwrap_or("");
    }
    let mut entries = Vec::new();
    if !body.is_empty() {
        for entry in split_top_level(body, ',') {
            if entry.is_empty() {
                return Err(EvalError::invalid("object", expr));
            }
            entries.push(parse_entry(entry, expr)?);
        }
    }
    Ok(ObjectParts { lets, entries })
}

fn recognize(expr: &str) -> bool {
    is_enclosed(expr, '{')
}

fn build(parts: &ObjectParts<'_>, input: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let mut map = Map::new();
    for (key, value_expr) in &parts.entries {
        let value = ctx.eval(value_expr, input)?;
        map.insert(key.clone(), value);
    }
    Ok(Value::Object(map))
}

fn eval(expr: &str, input: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let parts = parse_object(expr)?;
    if parts.lets.is_empty() {
        return build(&parts, input, ctx);
    }
    let mut frame = ctx.scope.child();
    for (name, value_expr) in &parts.lets {
        let value = ctx.with_scope(&frame).eval(value_expr, input)?;
        frame.bind(name, value);
    }
    build(&parts, input, &ctx.with_scope(&frame))
}

fn check(expr: &str, cx: &mut CheckCtx<'_>, scope: &Scope<'_>) {
    let parts = match parse_object(expr) {
        Ok(parts) => parts,
        Err(e) => return cx.report(e),
    };
    let mut frame = scope.child();
    for (name, value_expr) in &parts.lets {
        cx.check(value_expr, &frame);
        cx.declare(name);
        frame.bind(name, Value::Null);
    }
    let mut seen: Vec<&str> = Vec::new();
    for (key, value_expr) in &parts.entries {
        if seen.contains(&key.as_str()) {
            cx.warn(format!("Duplicate key \"{key}\": the later value wins"));
        } else {
            seen.push(key);
        }
        cx.check(value_expr, &frame);
    }
}

pub fn definition() -> EvaluatorDefinition {
    EvaluatorDefinition {
        name: "object",
        priority: CONSTRUCTION_PRIORITY,
        recognize,
        kind: |_| ExprKind::ObjectConstruction,
        eval_fn: eval,
        check_fn: Some(check),
    }
}
