use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::scope::Scope;
use crate::validate::CheckCtx;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The syntactic class of a recognized expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Literal,
    Path,
    ObjectConstruction,
    ArrayConstruction,
    VariableDeclaration,
    VariableReference,
    BinaryOperation,
    Conditional,
    ForLoop,
    FunctionCall,
    /// Recognized by an evaluator registered at runtime.
    Custom,
}

/// Recognition predicate over trimmed expression text.
pub type RecognizeFn = fn(&str) -> bool;

/// Reports which [`ExprKind`] a recognized expression belongs to.
pub type KindFn = fn(&str) -> ExprKind;

/// Evaluates a recognized expression against the current input value.
pub type EvalFn = for<'a> fn(&str, &Value, &EvalCtx<'a>) -> Result<Value, EvalError>;

/// Checks a recognized expression's structure without evaluating it.
///
/// Issues are pushed onto the [`CheckCtx`]; the scope carries declared
/// variable names only.
pub type CheckFn = fn(&str, &mut CheckCtx<'_>, &Scope<'_>);

/// One evaluation strategy, selected by priority-ordered recognition.
pub struct EvaluatorDefinition {
    pub name: &'static str,
    /// Higher priorities are tried first; ties keep registration order.
    pub priority: i32,
    pub recognize: RecognizeFn,
    pub kind: KindFn,
    pub eval_fn: EvalFn,
    /// `None` means recognition alone is enough for validation.
    pub check_fn: Option<CheckFn>,
}

impl fmt::Debug for EvaluatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorDefinition")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Function arity.
#[derive(Debug, Clone, PartialEq)]
pub enum Arity {
    /// Skip the arity check.
    Any,
    /// Exactly `n` arguments.
    Fixed(usize),
    /// Between `min` and `max` arguments. `None` for max = unlimited.
    Range(usize, Option<usize>),
}

impl Arity {
    pub fn accepts(&self, got: usize) -> bool {
        match self {
            Arity::Any => true,
            Arity::Fixed(n) => got == *n,
            Arity::Range(min, max) => got >= *min && max.map_or(true, |max| got <= max),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Any => write!(f, "any number of"),
            Arity::Fixed(n) => write!(f, "{n}"),
            Arity::Range(min, Some(max)) => write!(f, "{min} to {max}"),
            Arity::Range(min, None) => write!(f, "at least {min}"),
        }
    }
}

/// Asserts that a call passes an accepted number of arguments.
pub fn assert_arity(name: &str, arity: &Arity, got: usize) -> Result<(), EvalError> {
    if arity.accepts(got) {
        Ok(())
    } else {
        Err(EvalError::Arity {
            name: name.to_string(),
            expected: arity.to_string(),
            got,
        })
    }
}

/// The callable body of a function: a pure mapping from arguments to a value.
pub type CallFn = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// A named, arity-checked function invocable from expressions.
#[derive(Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub arity: Arity,
    pub description: String,
    pub call: CallFn,
}

impl FunctionDefinition {
    pub fn new<F>(name: &str, arity: Arity, description: &str, call: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        FunctionDefinition {
            name: name.to_string(),
            arity,
            description: description.to_string(),
            call: Arc::new(call),
        }
    }
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Map of function name -> definition.
pub type FunctionMap = HashMap<String, Arc<FunctionDefinition>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_ranges() {
        assert!(Arity::Fixed(1).accepts(1));
        assert!(!Arity::Fixed(1).accepts(2));
        assert!(Arity::Range(1, None).accepts(9));
        assert!(!Arity::Range(1, Some(2)).accepts(3));
        assert!(Arity::Any.accepts(0));
    }

    #[test]
    fn arity_error_names_the_function() {
        let err = assert_arity("size", &Arity::Fixed(1), 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Function size() expects 1 argument(s), got 2"
        );
    }
}
