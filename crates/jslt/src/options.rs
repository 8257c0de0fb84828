//! Engine configuration.

use std::env;
use std::str::FromStr;

pub const ENV_MAX_DEPTH: &str = "JSLT_MAX_DEPTH";
pub const ENV_MAX_SUGGESTIONS: &str = "JSLT_MAX_SUGGESTIONS";
pub const ENV_SUGGESTION_DISTANCE: &str = "JSLT_SUGGESTION_DISTANCE";

/// Options for [`crate::Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Maximum dispatcher recursion depth before evaluation fails.
    pub max_depth: usize,
    /// Maximum number of "did you mean" names offered per issue.
    pub max_suggestions: usize,
    /// Maximum edit distance for a name to count as a suggestion.
    pub suggestion_distance: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_suggestions: 3,
            suggestion_distance: 2,
        }
    }
}

impl EngineOptions {
    /// Defaults overlaid with any parsable `JSLT_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|name| env::var(name).ok())
    }

    /// Replaces each option whose `JSLT_*` setting `lookup` yields and
    /// parses. Unparsable settings are logged and skipped.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = setting(&lookup, ENV_MAX_DEPTH) {
            self.max_depth = v;
        }
        if let Some(v) = setting(&lookup, ENV_MAX_SUGGESTIONS) {
            self.max_suggestions = v;
        }
        if let Some(v) = setting(&lookup, ENV_SUGGESTION_DISTANCE) {
            self.suggestion_distance = v;
        }
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_suggestions(mut self, max_suggestions: usize) -> Self {
        self.max_suggestions = max_suggestions;
        self
    }

    pub fn with_suggestion_distance(mut self, distance: usize) -> Self {
        self.suggestion_distance = distance;
        self
    }
}

fn setting<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}
