use crate::dispatch::Dispatcher;
use crate::error::EvalError;
use crate::scope::Scope;
use serde_json::Value;

/// The execution context passed to every evaluator.
///
/// Carries the dispatcher for recursion into sub-expressions and the scope
/// frame currently in effect. Nothing in it is shared mutably, so one
/// dispatcher can serve many concurrent evaluations.
#[derive(Clone, Copy)]
pub struct EvalCtx<'a> {
    pub dispatcher: &'a Dispatcher,
    pub scope: &'a Scope<'a>,
    depth: usize,
}

impl<'a> EvalCtx<'a> {
    pub(crate) fn nested(dispatcher: &'a Dispatcher, scope: &'a Scope<'a>, depth: usize) -> Self {
        EvalCtx {
            dispatcher,
            scope,
            depth,
        }
    }

    /// Evaluates a sub-expression in the current scope.
    pub fn eval(&self, expr: &str, input: &Value) -> Result<Value, EvalError> {
        self.dispatcher
            .dispatch_at(expr, input, self.scope, self.depth)
    }

    /// The same context with `scope` as the innermost frame.
    pub fn with_scope<'b>(&'b self, scope: &'b Scope<'b>) -> EvalCtx<'b> {
        EvalCtx {
            dispatcher: self.dispatcher,
            scope,
            depth: self.depth,
        }
    }
}
