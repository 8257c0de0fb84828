//! Variable declarations (`let name = expr body`) and references
//! (`$name`, `$name.field[0]`).

use super::path::{self, Accessor};
use super::VARIABLE_PRIORITY;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::scanner::{ident_len, split_let, starts_with_keyword};
use crate::scope::Scope;
use crate::types::{EvaluatorDefinition, ExprKind};
use crate::validate::CheckCtx;
use serde_json::Value;

/// A parsed `let` declaration.
#[derive(Debug, PartialEq)]
pub struct LetBinding<'a> {
    pub name: &'a str,
    pub value: &'a str,
    /// What follows the bound value, if anything.
    pub body: Option<&'a str>,
}

/// Parses `let name = value [in] body`.
pub fn parse_let(expr: &str) -> Result<LetBinding<'_>, EvalError> {
    let invalid = || EvalError::invalid("let", expr);
    if !starts_with_keyword(expr, "let") {
        return Err(invalid());
    }
    let after_kw = expr[3..].trim_start();
    let name_len = ident_len(after_kw);
    if name_len == 0 {
        return Err(invalid());
    }
    let name = &after_kw[..name_len];
    let rest = after_kw[name_len..].trim_start();
    let rest = match rest.strip_prefix('=') {
        Some(r) if !r.starts_with('=') => r,
        _ => return Err(invalid()),
    };
    let (value, body) = split_let(rest);
    if value.is_empty() || body.is_some_and(str::is_empty) {
        return Err(invalid());
    }
    Ok(LetBinding { name, value, body })
}

/// Splits `$name.path` into the name and the parsed accessor chain.
pub fn parse_reference(expr: &str) -> Option<(&str, Vec<Accessor>)> {
    let rest = expr.strip_prefix('$')?;
    let len = ident_len(rest);
    if len == 0 {
        return None;
    }
    let accessors = path::parse_chain(&rest[len..]).ok()?;
    Some((&rest[..len], accessors))
}

fn recognize(expr: &str) -> bool {
    starts_with_keyword(expr, "let") || parse_reference(expr).is_some()
}

fn kind(expr: &str) -> ExprKind {
    if expr.starts_with('$') {
        ExprKind::VariableReference
    } else {
        ExprKind::VariableDeclaration
    }
}

fn eval(expr: &str, input: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    if let Some((name, accessors)) = parse_reference(expr) {
        let value = ctx
            .scope
            .lookup(name)
            .ok_or_else(|| EvalError::UnboundVariable {
                name: name.to_string(),
            })?;
        return Ok(path::apply(value, &accessors));
    }

    let binding = parse_let(expr)?;
    let value = ctx.eval(binding.value, input)?;
    match binding.body {
        None => Ok(value),
        Some(body) => {
            let mut frame = ctx.scope.child();
            frame.bind(binding.name, value);
            ctx.with_scope(&frame).eval(body, input)
        }
    }
}

fn check(expr: &str, cx: &mut CheckCtx<'_>, scope: &Scope<'_>) {
    if let Some((name, _)) = parse_reference(expr) {
        if !scope.has(name) {
            cx.report(EvalError::UnboundVariable {
                name: name.to_string(),
            });
        }
        return;
    }

    match parse_let(expr) {
        Err(e) => cx.report(e),
        Ok(binding) => {
            cx.check(binding.value, scope);
            cx.declare(binding.name);
            if let Some(body) = binding.body {
                let mut frame = scope.child();
                frame.bind(binding.name, Value::Null);
                cx.check(body, &frame);
            }
        }
    }
}

pub fn definition() -> EvaluatorDefinition {
    EvaluatorDefinition {
        name: "variable",
        priority: VARIABLE_PRIORITY,
        recognize,
        kind,
        eval_fn: eval,
        check_fn: Some(check),
    }
}
