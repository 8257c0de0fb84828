//! The function registry and the built-in functions.

use crate::error::EvalError;
use crate::evaluators::literal::parse_number;
use crate::types::{Arity, FunctionDefinition, FunctionMap};
use crate::value::{number_value, to_text, type_name};
use serde_json::{Number, Value};
use std::sync::Arc;

/// Named, arity-checked functions callable from expressions.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: FunctionMap,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `size`, `string`, `number`, `boolean` and `round`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for def in builtins() {
            registry.register(def);
        }
        registry
    }

    /// Adds `def`, replacing any function registered under the same name.
    pub fn register(&mut self, def: FunctionDefinition) {
        self.functions.insert(def.name.clone(), Arc::new(def));
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name).map(|def| def.as_ref())
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

// ----------------------------------------------------------------- Built-ins

fn conversion_error(function: &str, value: &Value) -> EvalError {
    EvalError::Conversion {
        function: function.to_string(),
        value: value.to_string(),
    }
}

fn size(args: &[Value]) -> Result<Value, EvalError> {
    let n = match &args[0] {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::String(s) => s.chars().count(),
        other => return Err(EvalError::type_error("array, object or string", type_name(other))),
    };
    Ok(Value::Number(Number::from(n)))
}

fn string(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::String(to_text(&args[0])))
}

fn number(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Number(_) => Ok(args[0].clone()),
        Value::Bool(b) => Ok(Value::Number(Number::from(u8::from(*b)))),
        Value::String(s) => parse_number(s.trim()).map_err(|_| conversion_error("number", &args[0])),
        other => Err(conversion_error("number", other)),
    }
}

fn boolean(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        other => Err(conversion_error("boolean", other)),
    }
}

fn round(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(args[0].clone()),
        // f64::round rounds half away from zero.
        Value::Number(n) => number_value(n.as_f64().unwrap_or(0.0).round()),
        other => Err(EvalError::type_error("number", type_name(other))),
    }
}

/// The built-in function set.
pub fn builtins() -> Vec<FunctionDefinition> {
    vec![
        FunctionDefinition::new(
            "size",
            Arity::Fixed(1),
            "Number of elements in an array, keys in an object or characters in a string",
            size,
        ),
        FunctionDefinition::new("string", Arity::Fixed(1), "Converts any value to a string", string),
        FunctionDefinition::new(
            "number",
            Arity::Fixed(1),
            "Converts a string, number or boolean to a number",
            number,
        ),
        FunctionDefinition::new("boolean", Arity::Fixed(1), "Passes a boolean through unchanged", boolean),
        FunctionDefinition::new(
            "round",
            Arity::Fixed(1),
            "Rounds a number to the nearest integer, halves away from zero",
            round,
        ),
    ]
}
