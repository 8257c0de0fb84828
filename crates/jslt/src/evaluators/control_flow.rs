//! Control flow: `if (cond) then [else other]` and `for (source) body`.

use super::CONTROL_FLOW_PRIORITY;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::scanner::{find_else, matching_close, starts_with_keyword};
use crate::scope::Scope;
use crate::types::{EvaluatorDefinition, ExprKind};
use crate::validate::CheckCtx;
use crate::value::type_name;
use serde_json::Value;

#[derive(Debug, PartialEq)]
pub struct IfParts<'a> {
    pub condition: &'a str,
    pub then_branch: &'a str,
    pub else_branch: Option<&'a str>,
}

#[derive(Debug, PartialEq)]
pub struct ForParts<'a> {
    pub source: &'a str,
    pub body: &'a str,
}

/// Splits `kw (head) rest` into the trimmed head and rest.
fn parse_head<'a>(expr: &'a str, kw: &'static str) -> Result<(&'a str, &'a str), EvalError> {
    let invalid = || EvalError::invalid(kw, expr);
    let after_kw = expr[kw.len()..].trim_start();
    if !after_kw.starts_with('(') {
        return Err(invalid());
    }
    let close = matching_close(after_kw, 0).ok_or_else(invalid)?;
    let head = after_kw[1..close].trim();
    let rest = after_kw[close + 1..].trim();
    if head.is_empty() || rest.is_empty() {
        return Err(invalid());
    }
    Ok((head, rest))
}

pub fn parse_if(expr: &str) -> Result<IfParts<'_>, EvalError> {
    let (condition, rest) = parse_head(expr, "if")?;
    let Some(pos) = find_else(rest) else {
        return Ok(IfParts {
            condition,
            then_branch: rest,
            else_branch: None,
        });
    };
    let then_branch = rest[..pos].trim();
    let else_branch = rest[pos + "else".len()..].trim();
    if then_branch.is_empty() || else_branch.is_empty() {
        return Err(EvalError::invalid("if", expr));
    }
    Ok(IfParts {
        condition,
        then_branch,
        else_branch: Some(else_branch),
    })
}

pub fn parse_for(expr: &str) -> Result<ForParts<'_>, EvalError> {
    let (source, body) = parse_head(expr, "for")?;
    Ok(ForParts { source, body })
}

fn eval_if(expr: &str, input: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let parts = parse_if(expr)?;
    match ctx.eval(parts.condition, input)? {
        Value::Bool(true) => ctx.eval(parts.then_branch, input),
        Value::Bool(false) => match parts.else_branch {
            Some(branch) => ctx.eval(branch, input),
            None => Ok(Value::Null),
        },
        other => Err(EvalError::type_error("boolean", type_name(&other))),
    }
}

/// Evaluates a `for` loop, producing one output element per source element.
///
/// Each iteration runs in its own frame with the element as the current
/// input. Results are kept as-is, `null` included.
pub fn eval_for(expr: &str, input: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let parts = parse_for(expr)?;
    let items = match ctx.eval(parts.source, input)? {
        Value::Array(items) => items,
        other => return Err(EvalError::type_error("array", type_name(&other))),
    };
    let mut results = Vec::with_capacity(items.len());
    for item in &items {
        let frame = ctx.scope.child();
        results.push(ctx.with_scope(&frame).eval(parts.body, item)?);
    }
    Ok(Value::Array(results))
}

fn recognize(expr: &str) -> bool {
    starts_with_keyword(expr, "if") || starts_with_keyword(expr, "for")
}

fn kind(expr: &str) -> ExprKind {
    if starts_with_keyword(expr, "if") {
        ExprKind::Conditional
    } else {
        ExprKind::ForLoop
    }
}

fn eval(expr: &str, input: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    if starts_with_keyword(expr, "if") {
        eval_if(expr, input, ctx)
    } else {
        eval_for(expr, input, ctx)
    }
}

pub fn check_for(expr: &str, cx: &mut CheckCtx<'_>, scope: &Scope<'_>) {
    match parse_for(expr) {
        Ok(parts) => {
            cx.check(parts.source, scope);
            cx.check(parts.body, &scope.child());
        }
        Err(e) => cx.report(e),
    }
}

fn check(expr: &str, cx: &mut CheckCtx<'_>, scope: &Scope<'_>) {
    if !starts_with_keyword(expr, "if") {
        return check_for(expr, cx, scope);
    }
    match parse_if(expr) {
        Ok(parts) => {
            cx.check(parts.condition, scope);
            cx.check(parts.then_branch, scope);
            if let Some(branch) = parts.else_branch {
                cx.check(branch, scope);
            }
        }
        Err(e) => cx.report(e),
    }
}

pub fn definition() -> EvaluatorDefinition {
    EvaluatorDefinition {
        name: "control-flow",
        priority: CONTROL_FLOW_PRIORITY,
        recognize,
        kind,
        eval_fn: eval,
        check_fn: Some(check),
    }
}
