//! Built-in evaluators, one per expression kind.

pub mod array;
pub mod control_flow;
pub mod function;
pub mod literal;
pub mod object;
pub mod operator;
pub mod path;
pub mod variable;

use crate::types::EvaluatorDefinition;
use std::sync::Arc;

pub const VARIABLE_PRIORITY: i32 = 100;
pub const CONTROL_FLOW_PRIORITY: i32 = 90;
pub const OPERATOR_PRIORITY: i32 = 80;
pub const CONSTRUCTION_PRIORITY: i32 = 70;
pub const FUNCTION_PRIORITY: i32 = 60;
pub const PATH_PRIORITY: i32 = 50;
pub const LITERAL_PRIORITY: i32 = 40;

/// All built-in evaluators in registration order.
pub fn all_evaluators() -> Vec<Arc<EvaluatorDefinition>> {
    vec![
        Arc::new(variable::definition()),
        Arc::new(control_flow::definition()),
        Arc::new(operator::definition()),
        Arc::new(object::definition()),
        Arc::new(array::definition()),
        Arc::new(function::definition()),
        Arc::new(path::definition()),
        Arc::new(literal::definition()),
    ]
}
