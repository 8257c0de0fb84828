use serde_json::Value;
use std::collections::HashMap;

/// One frame of the variable scope chain.
///
/// A frame borrows its parent, so it can never outlive the block that
/// created the parent: child frames are pushed by building a new `Scope` on
/// the stack and popped when it goes out of scope.
#[derive(Debug, Default)]
pub struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    bindings: HashMap<String, Value>,
}

impl<'a> Scope<'a> {
    /// An empty root frame.
    pub fn root() -> Self {
        Scope {
            parent: None,
            bindings: HashMap::new(),
        }
    }

    /// A new, empty frame whose lookups fall back to `self`.
    pub fn child(&self) -> Scope<'_> {
        Scope {
            parent: Some(self),
            bindings: HashMap::new(),
        }
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    pub fn bind(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    /// Walks the chain from this frame outward; the innermost binding wins.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let mut frame = Some(self);
        while let Some(scope) = frame {
            if let Some(value) = scope.bindings.get(name) {
                return Some(value);
            }
            frame = scope.parent;
        }
        None
    }

    /// Returns true if `name` is bound in this frame or any outer one.
    pub fn has(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Every visible name, innermost first, without duplicates.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut frame = Some(self);
        while let Some(scope) = frame {
            let mut own: Vec<&str> = scope.bindings.keys().map(String::as_str).collect();
            own.sort_unstable();
            for name in own {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            frame = scope.parent;
        }
        names
    }

    /// Number of frames in the chain, counting this one.
    pub fn depth(&self) -> usize {
        1 + self.parent.map_or(0, Scope::depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inner_frames_shadow_outer_ones() {
        let mut root = Scope::root();
        root.bind("x", json!(1));
        let mut inner = root.child();
        inner.bind("x", json!(2));
        assert_eq!(inner.lookup("x"), Some(&json!(2)));
        assert_eq!(root.lookup("x"), Some(&json!(1)));
    }

    #[test]
    fn lookup_falls_back_to_parents() {
        let mut root = Scope::root();
        root.bind("a", json!("outer"));
        let mid = root.child();
        let leaf = mid.child();
        assert_eq!(leaf.lookup("a"), Some(&json!("outer")));
        assert_eq!(leaf.depth(), 3);
    }

    #[test]
    fn unbound_is_none_not_null() {
        let mut root = Scope::root();
        root.bind("n", Value::Null);
        assert_eq!(root.lookup("n"), Some(&Value::Null));
        assert_eq!(root.lookup("missing"), None);
        assert!(!root.has("missing"));
    }

    #[test]
    fn names_lists_innermost_first() {
        let mut root = Scope::root();
        root.bind("b", json!(1));
        root.bind("a", json!(1));
        let mut inner = root.child();
        inner.bind("c", json!(1));
        inner.bind("a", json!(2));
        assert_eq!(inner.names(), vec!["a", "c", "b"]);
    }
}
