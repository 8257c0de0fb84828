//! The top-level entry points: transform and validate.

use crate::dispatch::Dispatcher;
use crate::error::EvalError;
use crate::functions::FunctionRegistry;
use crate::options::EngineOptions;
use crate::scope::Scope;
use crate::types::{EvaluatorDefinition, FunctionDefinition};
use crate::validate::{ValidationResult, Validator};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

/// Outcome of a transform. `execution_time_ms` is always set, even on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time_ms: f64,
}

impl TransformResult {
    fn from_outcome(outcome: Result<Value, EvalError>, elapsed_ms: f64) -> Self {
        let execution_time_ms = (elapsed_ms * 1000.0).round() / 1000.0;
        match outcome {
            Ok(output) => TransformResult {
                success: true,
                output: Some(output),
                error: None,
                execution_time_ms,
            },
            Err(e) => TransformResult {
                success: false,
                output: None,
                error: Some(e.to_string()),
                execution_time_ms,
            },
        }
    }
}

/// Owns the evaluator set and function registry.
///
/// Register custom functions and evaluators before sharing the engine;
/// afterwards it is only read, and `&Engine` can be used from many threads.
pub struct Engine {
    dispatcher: Dispatcher,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Engine {
            dispatcher: Dispatcher::new(options),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        self.dispatcher.options()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn functions(&self) -> &FunctionRegistry {
        self.dispatcher.functions()
    }

    pub fn register_function(&mut self, def: FunctionDefinition) {
        self.dispatcher.register_function(def);
    }

    pub fn register_evaluator(&mut self, def: EvaluatorDefinition) {
        self.dispatcher.register_evaluator(def);
    }

    /// Evaluates `expression` against `input`.
    pub fn transform(&self, input: &Value, expression: &str) -> TransformResult {
        tracing::debug!(expression, "transform started");
        let start = Instant::now();
        let outcome = self.dispatcher.dispatch(expression, input, &Scope::root());
        let result = TransformResult::from_outcome(outcome, elapsed_ms(start));
        tracing::debug!(
            success = result.success,
            elapsed_ms = result.execution_time_ms,
            "transform finished"
        );
        result
    }

    /// Like [`Engine::transform`], parsing `input` from JSON text first.
    pub fn transform_json(&self, input: &str, expression: &str) -> TransformResult {
        let start = Instant::now();
        match serde_json::from_str::<Value>(input) {
            Ok(value) => self.transform(&value, expression),
            Err(e) => {
                tracing::debug!(error = %e, "input is not valid JSON");
                TransformResult::from_outcome(
                    Err(EvalError::InvalidInput(e.to_string())),
                    elapsed_ms(start),
                )
            }
        }
    }

    /// Checks `expression` for structural problems without evaluating it.
    pub fn validate(&self, expression: &str) -> ValidationResult {
        tracing::debug!(expression, "validate started");
        let start = Instant::now();
        let result = Validator::new(&self.dispatcher).validate(expression);
        tracing::debug!(
            valid = result.valid,
            elapsed_ms = elapsed_ms(start),
            "validate finished"
        );
        result
    }

    /// Every blocking issue in `expression`, not only the first.
    pub fn diagnostics(&self, expression: &str) -> Vec<EvalError> {
        Validator::new(&self.dispatcher).diagnostics(expression)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failures_carry_the_message() {
        let result = Engine::new().transform(&json!({}), "$nope");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Undefined variable: $nope"));
        assert!(result.output.is_none());
        assert!(result.execution_time_ms >= 0.0);
    }

    #[test]
    fn malformed_input_json() {
        let result = Engine::new().transform_json("{not json", ".");
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Invalid input JSON"));
    }

    #[test]
    fn serialized_shape_skips_absent_fields() {
        let result = Engine::new().transform(&json!({"a": 1}), ".a");
        let text = serde_json::to_value(&result).unwrap();
        assert_eq!(text["success"], json!(true));
        assert_eq!(text["output"], json!(1));
        assert!(text.get("error").is_none());
    }
}
