//! Function calls: `name(arg, ...)`.

use super::FUNCTION_PRIORITY;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::scanner::{ident_len, matching_close, split_top_level};
use crate::scope::Scope;
use crate::types::{assert_arity, EvaluatorDefinition, ExprKind};
use crate::validate::CheckCtx;
use serde_json::Value;

#[derive(Debug, PartialEq)]
pub struct CallParts<'a> {
    pub name: &'a str,
    pub args: Vec<&'a str>,
}

/// Offset of the opening parenthesis, if `expr` is shaped like a call.
fn open_paren(expr: &str) -> Option<usize> {
    let name_len = ident_len(expr);
    if name_len == 0 {
        return None;
    }
    let rest = &expr[name_len..];
    let open = name_len + (rest.len() - rest.trim_start().len());
    let close = matching_close(expr, open)?;
    (expr[open..].starts_with('(') && close + 1 == expr.len()).then_some(open)
}

pub fn parse_call(expr: &str) -> Result<CallParts<'_>, EvalError> {
    let open = open_paren(expr).ok_or_else(|| EvalError::invalid("function call", expr))?;
    let name = expr[..ident_len(expr)].trim();
    let body = expr[open + 1..expr.len() - 1].trim();
    if body.is_empty() {
        return Ok(CallParts {
            name,
            args: Vec::new(),
        });
    }
    let args = split_top_level(body, ',');
    if args.iter().any(|a| a.is_empty()) {
        return Err(EvalError::invalid("function call", expr));
    }
    Ok(CallParts { name, args })
}

fn recognize(expr: &str) -> bool {
    open_paren(expr).is_some()
}

fn eval(expr: &str, input: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let call = parse_call(expr)?;
    let def = ctx
        .dispatcher
        .functions()
        .get(call.name)
        .ok_or_else(|| EvalError::UnknownFunction {
            name: call.name.to_string(),
        })?;
    assert_arity(&def.name, &def.arity, call.args.len())?;
    let args = call
        .args
        .iter()
        .map(|arg| ctx.eval(arg, input))
        .collect::<Result<Vec<_>, _>>()?;
    (def.call)(&args)
}

fn check(expr: &str, cx: &mut CheckCtx<'_>, scope: &Scope<'_>) {
    let call = match parse_call(expr) {
        Ok(call) => call,
        Err(e) => return cx.report(e),
    };
    match cx.dispatcher().functions().get(call.name) {
        None => cx.report(EvalError::UnknownFunction {
            name: call.name.to_string(),
        }),
        Some(def) => {
            if let Err(e) = assert_arity(&def.name, &def.arity, call.args.len()) {
                cx.report(e);
            }
        }
    }
    for arg in call.args {
        cx.check(arg, scope);
    }
}

pub fn definition() -> EvaluatorDefinition {
    EvaluatorDefinition {
        name: "function",
        priority: FUNCTION_PRIORITY,
        recognize,
        kind: |_| ExprKind::FunctionCall,
        eval_fn: eval,
        check_fn: Some(check),
    }
}
