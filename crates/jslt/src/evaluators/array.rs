//! Array construction: `[a, b, c]` and the comprehension form
//! `[for (source) body]`.

use super::control_flow::{check_for, eval_for};
use super::CONSTRUCTION_PRIORITY;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::scanner::{is_enclosed, split_top_level, starts_with_keyword};
use crate::scope::Scope;
use crate::types::{EvaluatorDefinition, ExprKind};
use crate::validate::CheckCtx;
use serde_json::Value;

fn inner(expr: &str) -> &str {
    expr[1..expr.len() - 1].trim()
}

/// Splits the array body into element expressions.
pub fn parse_elements(expr: &str) -> Result<Vec<&str>, EvalError> {
    let body = inner(expr);
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let elements = split_top_level(body, ',');
    if elements.iter().any(|e| e.is_empty()) {
        return Err(EvalError::invalid("array", expr));
    }
    Ok(elements)
}

fn recognize(expr: &str) -> bool {
    is_enclosed(expr, '[')
}

fn kind(expr: &str) -> ExprKind {
    if starts_with_keyword(inner(expr), "for") {
        ExprKind::ForLoop
    } else {
        ExprKind::ArrayConstruction
    }
}

fn eval(expr: &str, input: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let body = inner(expr);
    if starts_with_keyword(body, "for") {
        return eval_for(body, input, ctx);
    }
    let items = parse_elements(expr)?
        .into_iter()
        .map(|element| ctx.eval(element, input))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(items))
}

fn check(expr: &str, cx: &mut CheckCtx<'_>, scope: &Scope<'_>) {
    let body = inner(expr);
    if starts_with_keyword(body, "for") {
        return check_for(body, cx, scope);
    }
    match parse_elements(expr) {
        Ok(elements) => {
            for element in elements {
                cx.check(element, scope);
            }
        }
        Err(e) => cx.report(e),
    }
}

pub fn definition() -> EvaluatorDefinition {
    EvaluatorDefinition {
        name: "array",
        priority: CONSTRUCTION_PRIORITY,
        recognize,
        kind,
        eval_fn: eval,
        check_fn: Some(check),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_split_at_top_level() {
        assert_eq!(
            parse_elements(r#"[1, [2, 3], {"a": 4}, "x,y"]"#).unwrap(),
            vec!["1", "[2, 3]", "{\"a\": 4}", "\"x,y\""]
        );
        assert!(parse_elements("[]").unwrap().is_empty());
        assert!(parse_elements("[1,,2]").is_err());
    }

    #[test]
    fn comprehension_kind() {
        assert_eq!(kind("[for (.a) .b]"), ExprKind::ForLoop);
        assert_eq!(kind("[format]"), ExprKind::ArrayConstruction);
    }
}
