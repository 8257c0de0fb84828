//! Path expressions: `.`, `.field`, `."quoted field"`, `.list[0].name`.
//!
//! Navigation is forgiving: a missing field, a field access on a non-object,
//! an index on a non-array, or an index past the end all yield `null`.

use super::literal::parse_string;
use super::PATH_PRIORITY;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::types::{EvaluatorDefinition, ExprKind};
use serde_json::Value;

/// One step of a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    Field(String),
    Index(usize),
}

fn is_field_char(c: char) -> bool {
    !c.is_whitespace() && !".[](){}\"',:+=<>!$".contains(c)
}

struct ChainParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ChainParser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn error(&self) -> EvalError {
        EvalError::invalid("path", self.input)
    }

    fn parse(mut self) -> Result<Vec<Accessor>, EvalError> {
        let mut accessors = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.advance();
                    accessors.push(self.parse_field()?);
                }
                '[' => {
                    self.advance();
                    accessors.push(self.parse_index()?);
                }
                _ => return Err(self.error()),
            }
        }
        Ok(accessors)
    }

    fn parse_field(&mut self) -> Result<Accessor, EvalError> {
        let rest = &self.input[self.pos..];
        if rest.starts_with(['"', '\'']) {
            let quote = rest.chars().next().unwrap_or('"');
            let mut escaped = false;
            let end = rest
                .char_indices()
                .skip(1)
                .find(|&(_, c)| {
                    let closes = !escaped && c == quote;
                    escaped = !escaped && c == '\\';
                    closes
                })
                .map(|(i, _)| i + 1)
                .ok_or_else(|| self.error())?;
            let name = parse_string(&rest[..end])?;
            self.pos += end;
            return Ok(Accessor::Field(name));
        }
        let len = rest.find(|c: char| !is_field_char(c)).unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error());
        }
        self.pos += len;
        Ok(Accessor::Field(rest[..len].to_string()))
    }

    fn parse_index(&mut self) -> Result<Accessor, EvalError> {
        let rest = &self.input[self.pos..];
        let close = rest.find(']').ok_or_else(|| self.error())?;
        let digits = rest[..close].trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.error());
        }
        // Too large for any array, so it navigates to null.
        let index = digits.parse().unwrap_or(usize::MAX);
        self.pos += close + 1;
        Ok(Accessor::Index(index))
    }
}

/// Parses a chain of accessors such as `.a[0]."b c"`.
///
/// Every `.` must be followed by a field name; an empty chain is valid.
pub fn parse_chain(text: &str) -> Result<Vec<Accessor>, EvalError> {
    ChainParser {
        input: text,
        pos: 0,
    }
    .parse()
}

/// Parses a full path expression, which always starts with `.`.
pub fn parse_path(expr: &str) -> Result<Vec<Accessor>, EvalError> {
    match expr.strip_prefix('.') {
        None => Err(EvalError::invalid("path", expr)),
        Some("") => Ok(Vec::new()),
        Some(rest) if rest.starts_with('[') => parse_chain(rest),
        Some(_) => parse_chain(expr),
    }
}

/// Applies accessors to `value`, yielding `null` wherever navigation fails.
pub fn apply(value: &Value, accessors: &[Accessor]) -> Value {
    let mut current = value;
    for accessor in accessors {
        let next = match (accessor, current) {
            (Accessor::Field(name), Value::Object(map)) => map.get(name),
            (Accessor::Index(i), Value::Array(items)) => items.get(*i),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return Value::Null,
        }
    }
    current.clone()
}

fn recognize(expr: &str) -> bool {
    expr.starts_with('.') && parse_path(expr).is_ok()
}

fn eval(expr: &str, input: &Value, _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let accessors = parse_path(expr)?;
    Ok(apply(input, &accessors))
}

pub fn definition() -> EvaluatorDefinition {
    EvaluatorDefinition {
        name: "path",
        priority: PATH_PRIORITY,
        recognize,
        kind: |_| ExprKind::Path,
        eval_fn: eval,
        check_fn: None,
    }
}
