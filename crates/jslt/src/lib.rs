//! A JSLT-like JSON transformation language.
//!
//! # Overview
//!
//! An expression is text evaluated against a JSON input value. Paths
//! (`.a.b[0]`), literals, object and array construction, `let` bindings,
//! `if`/`else`, `for` loops, comparisons, `+` and built-in function calls
//! are supported.
//!
//! Evaluation is routed by a [`Dispatcher`] that tries a priority-ordered
//! set of [`EvaluatorDefinition`]s; each evaluator recurses into its
//! sub-expressions through the dispatcher.
//!
//! # Example
//!
//! ```
//! use jslt::Engine;
//! use serde_json::json;
//!
//! let engine = Engine::new();
//! let input = json!({"items": [{"name": "a"}, {"name": "b"}]});
//! let result = engine.transform(&input, "[for (.items) .name]");
//!
//! assert!(result.success);
//! assert_eq!(result.output, Some(json!(["a", "b"])));
//! ```

pub mod cli;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod eval_ctx;
pub mod evaluators;
pub mod functions;
pub mod options;
pub mod scanner;
pub mod scope;
pub mod types;
pub mod validate;
pub mod value;

pub use dispatch::Dispatcher;
pub use engine::{Engine, TransformResult};
pub use error::EvalError;
pub use eval_ctx::EvalCtx;
pub use functions::FunctionRegistry;
pub use options::EngineOptions;
pub use scope::Scope;
pub use types::{Arity, EvaluatorDefinition, ExprKind, FunctionDefinition};
pub use validate::{ValidationResult, Validator};

use serde_json::Value;
use std::sync::OnceLock;

fn default_engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| Engine::with_options(EngineOptions::from_env()))
}

/// Transforms `input` with a process-wide engine holding the built-ins.
pub fn transform(input: &Value, expression: &str) -> TransformResult {
    default_engine().transform(input, expression)
}

/// Validates `expression` with a process-wide engine holding the built-ins.
pub fn validate(expression: &str) -> ValidationResult {
    default_engine().validate(expression)
}
