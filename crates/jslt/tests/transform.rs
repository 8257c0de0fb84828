//! Integration tests for `Engine::transform`.

use jslt::value::type_name;
use jslt::{
    Arity, Dispatcher, Engine, EngineOptions, EvalError, EvaluatorDefinition, ExprKind,
    FunctionDefinition,
};
use serde_json::{json, Value};

fn check(expression: &str, input: Value, expected: Value) {
    let result = Engine::new().transform(&input, expression);
    let output = result
        .output
        .unwrap_or_else(|| panic!("transform({expression}) failed: {:?}", result.error));
    assert_eq!(output, expected, "expression: {expression}");
}

fn check_err(expression: &str, input: Value) -> String {
    let result = Engine::new().transform(&input, expression);
    assert!(!result.success, "expected error for {expression}");
    result
        .error
        .unwrap_or_else(|| panic!("missing error message for {expression}"))
}

// ----------------------------------------------------------------- Scenarios

#[test]
fn test_scenarios() {
    check(".a", json!({"a": 1}), json!(1));
    check("size(.skills)", json!({"skills": ["x", "y"]}), json!(2));
    check(r#"let x = 5 { "v": $x }"#, json!({}), json!({"v": 5}));
    check(
        r#"if (.age >= 18) "adult" else "minor""#,
        json!({"age": 30}),
        json!("adult"),
    );
    check(
        "[for (.items) .name]",
        json!({"items": [{"name": "a"}, {"name": "b"}]}),
        json!(["a", "b"]),
    );
}

// ----------------------------------------------------------------- Paths

#[test]
fn test_paths() {
    let input = json!({"a": {"b": [10, 20]}, "first name": "Ada"});
    check(".", input.clone(), input.clone());
    check(".a.b[1]", input.clone(), json!(20));
    check(".a.b", input.clone(), json!([10, 20]));
    check(r#"."first name""#, input.clone(), json!("Ada"));
}

#[test]
fn test_huge_index_is_out_of_bounds() {
    check(".a[99999999999999999999999]", json!({"a": [1, 2]}), Value::Null);
}

#[test]
fn test_missing_paths_are_null() {
    let input = json!({"a": {"b": [10, 20]}, "s": "text"});
    check(".missing", input.clone(), Value::Null);
    check(".missing.deeper", input.clone(), Value::Null);
    check(".a.b[5]", input.clone(), Value::Null);
    check(".s.field", input.clone(), Value::Null);
    check(".a[0]", input, Value::Null);
}

// ----------------------------------------------------------------- Literals

#[test]
fn test_literals() {
    check(r#""hi""#, json!(null), json!("hi"));
    check("'single'", json!(null), json!("single"));
    check(r#""esc\"aped""#, json!(null), json!("esc\"aped"));
    check("-2.5", json!(null), json!(-2.5));
    check("1e3", json!(null), json!(1000));
    check("42", json!(null), json!(42));
    check("true", json!(null), json!(true));
    check("null", json!(1), Value::Null);
}

#[test]
fn test_malformed_literals() {
    assert_eq!(
        check_err("1.2.3", json!(null)),
        "Malformed number literal: 1.2.3"
    );
    assert!(check_err(r#""abc"#, json!(null)).starts_with("Unterminated string literal"));
    assert_eq!(check_err("007", json!(null)), "Malformed number literal: 007");
    assert_eq!(check_err("1e400", json!(null)), "Malformed number literal: 1e400");
}

#[test]
fn test_misplaced_tokens_are_syntax_errors() {
    assert_eq!(
        check_err("let x = 5 $x", json!(null)),
        "Invalid expression: 5 $x"
    );
    assert_eq!(
        check_err(r#"{"a": 1 "b": 2}"#, json!(null)),
        r#"Invalid expression: 1 "b": 2"#
    );
}

#[test]
fn test_numbers_out_of_range() {
    assert_eq!(
        check_err("1e308 + 1e308", json!(null)),
        "Number out of range: inf"
    );
    assert_eq!(
        check_err(". + .", json!(-1.7e308)),
        "Number out of range: -inf"
    );
    assert_eq!(
        check_err(r#"number("1e400")"#, json!(null)),
        r#"Cannot convert "1e400" with number()"#
    );
    assert_eq!(
        check_err(r#"number("007")"#, json!(null)),
        r#"Cannot convert "007" with number()"#
    );
    assert_eq!(
        check_err(r#"number("1.")"#, json!(null)),
        r#"Cannot convert "1." with number()"#
    );
}

// ----------------------------------------------------------------- Construction

#[test]
fn test_object_construction() {
    check(
        r#"{"name": .user.name, "tags": size(.tags), "nested": {"list": [1, .x]}}"#,
        json!({"user": {"name": "Ada"}, "tags": ["a", "b"], "x": true}),
        json!({"name": "Ada", "tags": 2, "nested": {"list": [1, true]}}),
    );
    check("{}", json!(null), json!({}));
    check("{ bare: 1, 'quoted': 2 }", json!(null), json!({"bare": 1, "quoted": 2}));
}

#[test]
fn test_object_key_order_follows_source() {
    let result = Engine::new().transform(&json!({}), r#"{"z": 1, "a": 2, "m": 3}"#);
    let text = serde_json::to_string(&result.output.unwrap()).unwrap();
    assert_eq!(text, r#"{"z":1,"a":2,"m":3}"#);
}

#[test]
fn test_duplicate_key_later_value_first_position() {
    let result = Engine::new().transform(&json!({}), r#"{"a": 1, "b": 2, "a": 3}"#);
    let text = serde_json::to_string(&result.output.unwrap()).unwrap();
    assert_eq!(text, r#"{"a":3,"b":2}"#);
}

#[test]
fn test_array_construction() {
    check("[]", json!(null), json!([]));
    check(r#"[1, "two", .x, [3]]"#, json!({"x": null}), json!([1, "two", null, [3]]));
    let err = check_err("[1,,2]", json!(null));
    assert!(err.starts_with("Invalid array expression"), "got: {err}");
}

// ----------------------------------------------------------------- Variables

#[test]
fn test_let_forms() {
    check("let x = 3", json!(null), json!(3));
    check("let x = .a in $x", json!({"a": "v"}), json!("v"));
    check("let x = .a\n$x", json!({"a": "v"}), json!("v"));
    check(
        "let a = 1 let b = $a + 1 [$a, $b]",
        json!(null),
        json!([1, 2]),
    );
    check(
        r#"let user = .user { "city": $user.address.city }"#,
        json!({"user": {"address": {"city": "Oslo"}}}),
        json!({"city": "Oslo"}),
    );
}

#[test]
fn test_object_leading_lets() {
    check(
        r#"{ let t = .a "x": $t, "y": $t + 1 }"#,
        json!({"a": 7}),
        json!({"x": 7, "y": 8}),
    );
}

#[test]
fn test_shadowing_is_scoped() {
    check("let x = 1 in let x = 2 in $x", json!(null), json!(2));
    check("let x = 1 in [let x = 2 in $x, $x]", json!(null), json!([2, 1]));
}

#[test]
fn test_unbound_variable() {
    assert_eq!(check_err("$missing", json!({})), "Undefined variable: $missing");
    assert_eq!(
        check_err("[let y = 1 in $y, $y]", json!({})),
        "Undefined variable: $y"
    );
}

// ----------------------------------------------------------------- Operators

#[test]
fn test_addition_and_concatenation() {
    check("1 + 2", json!(null), json!(3));
    check("0.5 + 0.25", json!(null), json!(0.75));
    check(r#""Hello, " + .name"#, json!({"name": "Ada"}), json!("Hello, Ada"));
    check(r#""n=" + 1 + 2"#, json!(null), json!("n=12"));
    check(r#""v: " + .list"#, json!({"list": [1]}), json!("v: [1]"));
    check("size(.a)+1", json!({"a": [1, 2]}), json!(3));
}

#[test]
fn test_comparisons() {
    check("1 + 2 == 3", json!(null), json!(true));
    check("1 == 1.0", json!(null), json!(true));
    check(r#"1 == "1""#, json!(null), json!(false));
    check(r#""b" > "a""#, json!(null), json!(true));
    check(".a != null", json!({"a": 0}), json!(true));
    check(".x<=.y", json!({"x": 2, "y": 2}), json!(true));
}

#[test]
fn test_operator_type_errors() {
    assert_eq!(
        check_err(r#"1 > "a""#, json!(null)),
        "Type error: expected number, got string"
    );
    assert_eq!(
        check_err(r#"1 + "a""#, json!(null)),
        "Type error: expected number, got string"
    );
    assert_eq!(
        check_err("null + 1", json!(null)),
        "Type error: expected number or string, got null"
    );
}

// ----------------------------------------------------------------- Control flow

#[test]
fn test_if() {
    check(r#"if (.a > 5) "big""#, json!({"a": 1}), Value::Null);
    check(r#"if (.a > 5) "big" else "small""#, json!({"a": 9}), json!("big"));
    let nested = "if (.a) if (.b) 1 else 2 else 3";
    check(nested, json!({"a": true, "b": false}), json!(2));
    check(nested, json!({"a": false, "b": true}), json!(3));
}

#[test]
fn test_if_requires_boolean() {
    assert_eq!(
        check_err("if (.a) 1 else 2", json!({"a": 1})),
        "Type error: expected boolean, got number"
    );
}

#[test]
fn test_for() {
    check("for (.xs) . + 1", json!({"xs": [1, 2]}), json!([2, 3]));
    check("[for (.xs) .]", json!({"xs": []}), json!([]));
    check(
        r#"[for (.people) {"who": .name, "adult": .age >= 18}]"#,
        json!({"people": [{"name": "a", "age": 20}, {"name": "b", "age": 9}]}),
        json!([{"who": "a", "adult": true}, {"who": "b", "adult": false}]),
    );
    check(
        "let m = 10 [for (.xs) . + $m]",
        json!({"xs": [1, 2]}),
        json!([11, 12]),
    );
}

#[test]
fn test_for_keeps_nulls() {
    check(
        "[for (.xs) if (. > 1) .]",
        json!({"xs": [1, 2, 3]}),
        json!([null, 2, 3]),
    );
}

#[test]
fn test_for_requires_array() {
    assert_eq!(
        check_err("[for (.) 1]", json!({"a": 1})),
        "Type error: expected array, got object"
    );
}

// ----------------------------------------------------------------- Functions

#[test]
fn test_builtin_functions() {
    check("string(3.0)", json!(null), json!("3"));
    check("string(.)", json!({"k": [true]}), json!(r#"{"k":[true]}"#));
    check("number(.s)", json!({"s": "42"}), json!(42));
    check("boolean(.b)", json!({"b": false}), json!(false));
    check("round(2.5)", json!(null), json!(3));
    check("round(-2.5)", json!(null), json!(-3));
    check("size(.s)", json!({"s": "héllo"}), json!(5));
    check("size(.o)", json!({"o": {"a": 1, "b": 2}}), json!(2));
}

#[test]
fn test_function_errors() {
    assert_eq!(check_err("nope(1)", json!(null)), "Unknown function: nope");
    assert_eq!(
        check_err("size(1, 2)", json!(null)),
        "Function size() expects 1 argument(s), got 2"
    );
    assert_eq!(
        check_err("boolean(1)", json!(null)),
        "Cannot convert 1 with boolean()"
    );
    assert_eq!(
        check_err(r#"number("x1")"#, json!(null)),
        r#"Cannot convert "x1" with number()"#
    );
}

// ----------------------------------------------------------------- Errors

#[test]
fn test_syntax_errors() {
    assert_eq!(check_err("", json!(null)), "Invalid expression: ");
    assert_eq!(check_err("  @  ", json!(null)), "Invalid expression: @");
    assert_eq!(check_err("{", json!(null)), "Invalid expression: {");
}

#[test]
fn test_errors_abort_enclosing_evaluation() {
    let result = Engine::new().transform(&json!({}), r#"{"ok": 1, "bad": $nope}"#);
    assert!(!result.success);
    assert!(result.output.is_none());
}

#[test]
fn test_depth_limit() {
    let engine = Engine::with_options(EngineOptions::default().with_max_depth(3));
    let result = engine.transform(&json!(null), "[[[[1]]]]");
    assert_eq!(
        result.error.as_deref(),
        Some("Expression nesting exceeds the depth limit of 3")
    );
    assert!(engine.transform(&json!(null), "[[1]]").success);
}

// ----------------------------------------------------------------- Extension

#[test]
fn test_register_function() {
    let mut engine = Engine::new();
    engine.register_function(FunctionDefinition::new(
        "upper",
        Arity::Fixed(1),
        "Uppercases a string",
        |args| match &args[0] {
            Value::String(s) => Ok(Value::String(s.to_uppercase())),
            other => Err(EvalError::type_error("string", type_name(other))),
        },
    ));
    let result = engine.transform(&json!({"name": "ada"}), r#"{"n": upper(.name)}"#);
    assert_eq!(result.output, Some(json!({"n": "ADA"})));
    assert!(engine.functions().names().contains(&"upper"));
}

#[test]
fn test_register_evaluator() {
    let mut engine = Engine::new();
    engine.register_evaluator(EvaluatorDefinition {
        name: "now",
        priority: 95,
        recognize: |expr| expr == "@now",
        kind: |_| ExprKind::Custom,
        eval_fn: |_, _, _| Ok(json!("2024-01-01")),
        check_fn: None,
    });
    let result = engine.transform(&json!({}), r#"{"t": @now}"#);
    assert_eq!(result.output, Some(json!({"t": "2024-01-01"})));
    assert!(engine.validate("@now").valid);
    assert_eq!(engine.dispatcher().classify("@now").unwrap(), ExprKind::Custom);
}

#[test]
fn test_classify() {
    let dispatcher = Dispatcher::default();
    assert_eq!(dispatcher.classify("[for (.a) .]").unwrap(), ExprKind::ForLoop);
    assert_eq!(dispatcher.classify("let x = 1").unwrap(), ExprKind::VariableDeclaration);
    assert_eq!(dispatcher.classify("$x.y").unwrap(), ExprKind::VariableReference);
    assert_eq!(dispatcher.classify("$x + 1").unwrap(), ExprKind::BinaryOperation);
    assert_eq!(dispatcher.classify(".a + 1").unwrap(), ExprKind::BinaryOperation);
    assert_eq!(dispatcher.classify(".a[0]").unwrap(), ExprKind::Path);
    assert_eq!(dispatcher.classify("round(1)").unwrap(), ExprKind::FunctionCall);
    assert_eq!(dispatcher.classify("if (.a) 1").unwrap(), ExprKind::Conditional);
    assert_eq!(dispatcher.classify("{}").unwrap(), ExprKind::ObjectConstruction);
    assert_eq!(dispatcher.classify("'x'").unwrap(), ExprKind::Literal);
}

// ----------------------------------------------------------------- Entry points

#[test]
fn test_transform_json() {
    let engine = Engine::new();
    let result = engine.transform_json(r#"{"a": [1, 2, 3]}"#, "size(.a)");
    assert_eq!(result.output, Some(json!(3)));
    let result = engine.transform_json("[1,", ".");
    assert!(!result.success);
}

#[test]
fn test_global_entry_points() {
    assert_eq!(jslt::transform(&json!({"a": 1}), ".a").output, Some(json!(1)));
    assert!(!jslt::validate("{").valid);
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = Engine::new();
    std::thread::scope(|s| {
        for i in 0..4 {
            let engine = &engine;
            s.spawn(move || {
                let result = engine.transform(&json!({"i": i}), ".i + 1");
                assert_eq!(result.output, Some(json!(i + 1)));
            });
        }
    });
}
