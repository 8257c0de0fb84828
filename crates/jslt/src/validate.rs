//! Structural validation without evaluation.
//!
//! The validator runs the dispatcher's recognition over the expression tree
//! and calls each evaluator's check function instead of its eval function.
//! Variables are tracked by name only, so `$name` references can be
//! checked against the `let`s that enclose them.

use crate::dispatch::Dispatcher;
use crate::error::EvalError;
use crate::scope::Scope;
use serde::Serialize;
use strsim::levenshtein;

const KEYWORDS: &[&str] = &["let", "if", "for"];

const SYNTAX_HINTS: &[&str] = &[
    "Use .field to access object properties",
    "Use .array[0] to access array elements",
    "Use {} for object construction",
    "Use [] for array construction",
];

/// Outcome of [`crate::Engine::validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// State threaded through a validation walk.
pub struct CheckCtx<'a> {
    dispatcher: &'a Dispatcher,
    issues: Vec<EvalError>,
    warnings: Vec<String>,
    declared: Vec<String>,
    depth: usize,
}

impl<'a> CheckCtx<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        CheckCtx {
            dispatcher,
            issues: Vec::new(),
            warnings: Vec::new(),
            declared: Vec::new(),
            depth: 0,
        }
    }

    pub fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }

    /// Checks a sub-expression, recording issues instead of failing.
    pub fn check(&mut self, expr: &str, scope: &Scope<'_>) {
        let limit = self.dispatcher.options().max_depth;
        if self.depth >= limit {
            return self.report(EvalError::DepthLimit { limit });
        }
        let expr = expr.trim();
        let dispatcher = self.dispatcher;
        match dispatcher.resolve(expr) {
            Ok(def) => {
                if let Some(check_fn) = def.check_fn {
                    self.depth += 1;
                    check_fn(expr, self, scope);
                    self.depth -= 1;
                }
            }
            Err(e) => self.report(e),
        }
    }

    /// Records a blocking issue.
    pub fn report(&mut self, issue: EvalError) {
        self.issues.push(issue);
    }

    /// Records an advisory warning that does not invalidate the expression.
    pub fn warn(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Records a variable name declared anywhere in the expression.
    pub fn declare(&mut self, name: &str) {
        if !self.declared.iter().any(|d| d == name) {
            self.declared.push(name.to_string());
        }
    }
}

/// Validates expressions against a dispatcher's evaluators and functions.
pub struct Validator<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> Validator<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Validator { dispatcher }
    }

    fn walk(&self, expr: &str) -> CheckCtx<'a> {
        let mut cx = CheckCtx::new(self.dispatcher);
        cx.check(expr, &Scope::root());
        cx
    }

    /// Every blocking issue in `expr`, in discovery order.
    pub fn diagnostics(&self, expr: &str) -> Vec<EvalError> {
        self.walk(expr).issues
    }

    pub fn validate(&self, expr: &str) -> ValidationResult {
        let cx = self.walk(expr);
        let Some(first) = cx.issues.first() else {
            return ValidationResult {
                valid: true,
                error: None,
                suggestions: cx.warnings,
            };
        };
        let mut suggestions = self.suggest(first, &cx.declared);
        suggestions.extend(cx.warnings.iter().cloned());
        ValidationResult {
            valid: false,
            error: Some(first.to_string()),
            suggestions,
        }
    }

    fn suggest(&self, issue: &EvalError, declared: &[String]) -> Vec<String> {
        let functions = self.dispatcher.functions();
        match issue {
            EvalError::UnknownFunction { name } => {
                let mut out: Vec<String> = self
                    .closest(name, functions.names())
                    .into_iter()
                    .map(|n| format!("Did you mean {n}()?"))
                    .collect();
                let available: Vec<String> =
                    functions.names().iter().map(|n| format!("{n}()")).collect();
                out.push(format!("Available functions: {}", available.join(", ")));
                out
            }
            EvalError::UnboundVariable { name } => {
                let close = self.closest(name, declared.iter().map(String::as_str));
                if close.is_empty() {
                    vec![format!("Declare it first: let {name} = <expression>")]
                } else {
                    close.into_iter().map(|n| format!("Did you mean ${n}?")).collect()
                }
            }
            EvalError::Arity { name, .. } => functions
                .get(name)
                .map(|def| {
                    vec![format!(
                        "{}() takes {} argument(s): {}",
                        def.name, def.arity, def.description
                    )]
                })
                .unwrap_or_default(),
            EvalError::Syntax { fragment } => {
                let word: String = fragment
                    .trim_start()
                    .chars()
                    .take_while(|c| c.is_ascii_alphabetic())
                    .collect();
                let keywords = self.closest(&word, KEYWORDS.iter().copied());
                if word.is_empty() || keywords.is_empty() {
                    SYNTAX_HINTS.iter().map(|s| s.to_string()).collect()
                } else {
                    keywords
                        .into_iter()
                        .map(|k| format!("Did you mean the keyword '{k}'?"))
                        .collect()
                }
            }
            EvalError::InvalidConstruct { construct, .. } => match *construct {
                "if" => vec!["Use: if (condition) value else other".to_string()],
                "for" => vec!["Use: for (array) body".to_string()],
                "let" => vec!["Use: let name = value body".to_string()],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Names within the configured edit distance of `name`, nearest first.
    fn closest<'n>(&self, name: &str, candidates: impl IntoIterator<Item = &'n str>) -> Vec<String> {
        let opts = self.dispatcher.options();
        let mut scored: Vec<(usize, &str)> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let dist = levenshtein(name, candidate);
                (dist <= opts.suggestion_distance && dist > 0).then_some((dist, candidate))
            })
            .collect();
        scored.sort_by_key(|(dist, _)| *dist);
        scored
            .into_iter()
            .take(opts.max_suggestions)
            .map(|(_, s)| s.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(expr: &str) -> ValidationResult {
        let dispatcher = Dispatcher::default();
        Validator::new(&dispatcher).validate(expr)
    }

    #[test]
    fn well_formed_expression() {
        let result = validate(r#"{ "n": size(.items), "first": .items[0] }"#);
        assert!(result.valid, "{result:?}");
        assert!(result.error.is_none());
    }

    #[test]
    fn unknown_function_suggests_nearest() {
        let result = validate("siez(.a)");
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Unknown function: siez"));
        assert_eq!(result.suggestions[0], "Did you mean size()?");
        assert!(result.suggestions.last().unwrap().starts_with("Available functions: boolean()"));
    }

    #[test]
    fn collects_every_issue() {
        let dispatcher = Dispatcher::default();
        let issues = Validator::new(&dispatcher).diagnostics(r#"[nope(1), $missing, size(1, 2)]"#);
        assert_eq!(issues.len(), 3);
        assert!(matches!(issues[1], EvalError::UnboundVariable { .. }));
        assert!(matches!(issues[2], EvalError::Arity { .. }));
    }

    #[test]
    fn let_names_are_in_scope() {
        assert!(validate("let total = .a { \"t\": $total }").valid);
        let result = validate("let total = .a { \"t\": $totl }");
        assert_eq!(result.suggestions, vec!["Did you mean $total?"]);
    }

    #[test]
    fn keyword_typo() {
        let result = validate("iff (.a) 1");
        assert!(!result.valid);
        assert_eq!(result.suggestions, vec!["Did you mean the keyword 'if'?"]);
    }

    #[test]
    fn generic_syntax_hints() {
        let result = validate("@@");
        assert_eq!(result.suggestions.len(), SYNTAX_HINTS.len());
    }

    #[test]
    fn duplicate_key_is_a_warning() {
        let result = validate(r#"{ "a": 1, "a": 2 }"#);
        assert!(result.valid);
        assert_eq!(result.suggestions, vec![r#"Duplicate key "a": the later value wins"#]);
    }
}
