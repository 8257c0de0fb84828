use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Invalid expression: {fragment}")]
    Syntax { fragment: String },

    #[error("Undefined variable: ${name}")]
    UnboundVariable { name: String },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("Function {name}() expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("Type error: expected {expected}, got {got}")]
    Type { expected: String, got: String },

    #[error("Cannot convert {value} with {function}()")]
    Conversion { function: String, value: String },

    #[error("Malformed number literal: {literal}")]
    MalformedNumber { literal: String },

    #[error("Number out of range: {value}")]
    NumberOutOfRange { value: String },

    #[error("Unterminated string literal: {literal}")]
    UnterminatedString { literal: String },

    #[error("Invalid {construct} expression: {fragment}")]
    InvalidConstruct {
        construct: &'static str,
        fragment: String,
    },

    #[error("Expression nesting exceeds the depth limit of {limit}")]
    DepthLimit { limit: usize },

    #[error("Invalid input JSON: {0}")]
    InvalidInput(String),
}

impl EvalError {
    pub fn syntax(fragment: &str) -> Self {
        EvalError::Syntax {
            fragment: fragment.to_string(),
        }
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        EvalError::Type {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    pub fn invalid(construct: &'static str, fragment: &str) -> Self {
        EvalError::InvalidConstruct {
            construct,
            fragment: fragment.to_string(),
        }
    }
}
