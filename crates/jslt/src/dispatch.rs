//! Priority-ordered expression dispatch.

use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluators;
use crate::functions::FunctionRegistry;
use crate::options::EngineOptions;
use crate::scope::Scope;
use crate::types::{EvaluatorDefinition, ExprKind, FunctionDefinition};
use serde_json::Value;
use std::cmp::Reverse;
use std::sync::Arc;

/// Holds the ordered evaluator set and the function registry, and routes
/// each expression to the first evaluator that recognizes it.
///
/// Registration takes `&mut self`, so it has to finish before the
/// dispatcher is shared for evaluation.
pub struct Dispatcher {
    evaluators: Vec<Arc<EvaluatorDefinition>>,
    functions: FunctionRegistry,
    options: EngineOptions,
}

impl Dispatcher {
    /// A dispatcher with the built-in evaluators and functions.
    pub fn new(options: EngineOptions) -> Self {
        let mut dispatcher = Dispatcher {
            evaluators: Vec::new(),
            functions: FunctionRegistry::with_builtins(),
            options,
        };
        for def in evaluators::all_evaluators() {
            dispatcher.push_evaluator(def);
        }
        dispatcher
    }

    /// A dispatcher with no evaluators and no functions.
    pub fn empty(options: EngineOptions) -> Self {
        Dispatcher {
            evaluators: Vec::new(),
            functions: FunctionRegistry::new(),
            options,
        }
    }

    fn push_evaluator(&mut self, def: Arc<EvaluatorDefinition>) {
        self.evaluators.push(def);
        // Stable sort: equal priorities keep registration order.
        self.evaluators.sort_by_key(|e| Reverse(e.priority));
    }

    pub fn register_evaluator(&mut self, def: EvaluatorDefinition) {
        tracing::debug!(name = def.name, priority = def.priority, "registering evaluator");
        self.push_evaluator(Arc::new(def));
    }

    pub fn register_function(&mut self, def: FunctionDefinition) {
        tracing::debug!(name = %def.name, "registering function");
        self.functions.register(def);
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Evaluators in the order they are tried.
    pub fn evaluators(&self) -> impl Iterator<Item = &EvaluatorDefinition> {
        self.evaluators.iter().map(|e| e.as_ref())
    }

    /// Selects the evaluator responsible for `expr` (already trimmed).
    pub fn resolve(&self, expr: &str) -> Result<&EvaluatorDefinition, EvalError> {
        if expr.is_empty() {
            return Err(EvalError::syntax(expr));
        }
        self.evaluators
            .iter()
            .find(|def| (def.recognize)(expr))
            .map(|def| def.as_ref())
            .ok_or_else(|| EvalError::syntax(expr))
    }

    /// The syntactic class of `expr`.
    pub fn classify(&self, expr: &str) -> Result<ExprKind, EvalError> {
        let expr = expr.trim();
        let def = self.resolve(expr)?;
        Ok((def.kind)(expr))
    }

    /// Evaluates `expr` against `input` with `scope` as the innermost frame.
    pub fn dispatch(&self, expr: &str, input: &Value, scope: &Scope<'_>) -> Result<Value, EvalError> {
        self.dispatch_at(expr, input, scope, 0)
    }

    pub(crate) fn dispatch_at(
        &self,
        expr: &str,
        input: &Value,
        scope: &Scope<'_>,
        depth: usize,
    ) -> Result<Value, EvalError> {
        if depth >= self.options.max_depth {
            return Err(EvalError::DepthLimit {
                limit: self.options.max_depth,
            });
        }
        let expr = expr.trim();
        let def = self.resolve(expr)?;
        tracing::trace!(evaluator = def.name, depth, expr, "dispatch");
        let ctx = EvalCtx::nested(self, scope, depth + 1);
        (def.eval_fn)(expr, input, &ctx)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
