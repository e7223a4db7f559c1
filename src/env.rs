//! A lexically-scoped binding chain, generic over its payload.
//!
//! Used twice with two different payloads (`spec.md` §9's "Environment +
//! types, twice" note): the analyser binds `Type`, the IR builder binds
//! `(ir::Value, Type)`. `define` always writes into the current (innermost)
//! scope; `lookup` walks outward through parents.

use std::collections::HashMap;

pub struct Environment<T> {
    records: HashMap<String, T>,
    parent: Option<Box<Environment<T>>>,
    name: String,
}

impl<T> Environment<T> {
    pub fn new(name: impl Into<String>) -> Environment<T> {
        Environment {
            records: HashMap::new(),
            parent: None,
            name: name.into(),
        }
    }

    /// Open a child scope, taking ownership of the parent so it can be
    /// recovered later with `close`.
    pub fn child(self, name: impl Into<String>) -> Environment<T> {
        Environment {
            records: HashMap::new(),
            parent: Some(Box::new(self)),
            name: name.into(),
        }
    }

    /// Discard the current scope, returning the parent it was opened from.
    /// Panics if called on a root scope — callers must only close scopes
    /// they themselves opened with `child`.
    pub fn close(self) -> Environment<T> {
        *self.parent.expect("closed a root environment")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `name` in the current (innermost) scope, shadowing any binding
    /// of the same name in an enclosing scope.
    pub fn define(&mut self, name: impl Into<String>, value: T) {
        self.records.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.records
            .get(name)
            .or_else(|| self.parent.as_ref().and_then(|p| p.lookup(name)))
    }

    /// Whether `name` is bound in the current scope only (not an ancestor) —
    /// used to reject a `VarAssign` with a type annotation that would
    /// redeclare an existing local.
    pub fn defined_locally(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parent_chain() {
        let mut root: Environment<i32> = Environment::new("root");
        root.define("x", 1);
        let mut inner = root.child("inner");
        inner.define("y", 2);
        assert_eq!(inner.lookup("x"), Some(&1));
        assert_eq!(inner.lookup("y"), Some(&2));
    }

    #[test]
    fn shadowing_prefers_innermost() {
        let mut root: Environment<i32> = Environment::new("root");
        root.define("x", 1);
        let mut inner = root.child("inner");
        inner.define("x", 2);
        assert_eq!(inner.lookup("x"), Some(&2));
    }

    #[test]
    fn close_restores_parent_bindings() {
        let mut root: Environment<i32> = Environment::new("root");
        root.define("x", 1);
        let mut inner = root.child("inner");
        inner.define("y", 2);
        let root = inner.close();
        assert_eq!(root.lookup("y"), None);
        assert_eq!(root.lookup("x"), Some(&1));
    }

    #[test]
    fn defined_locally_ignores_ancestors() {
        let mut root: Environment<i32> = Environment::new("root");
        root.define("x", 1);
        let inner = root.child("inner");
        assert!(!inner.defined_locally("x"));
    }

    #[test]
    fn unbound_name_is_none() {
        let root: Environment<i32> = Environment::new("root");
        assert_eq!(root.lookup("missing"), None);
    }
}
