//! Environment for variable bindings

use super::{InterpResult, Object, RuntimeError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// Environment holding variable bindings
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Variable bindings in this scope
    bindings: HashMap<String, Object>,
    /// Enclosing environment for lexical scoping
    outer: Option<EnvRef>,
}

impl Environment {
    /// Create a new global environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope whose misses fall through to `outer`
    pub fn new_enclosed(outer: EnvRef) -> Self {
        Environment {
            bindings: HashMap::new(),
            outer: Some(outer),
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this scope only and return the bound value.
    ///
    /// An outer binding of the same name is shadowed, never overwritten.
    pub fn set(&mut self, name: impl Into<String>, value: Object) -> Object {
        self.bindings.insert(name.into(), value.clone());
        value
    }

    /// Look up a name through the scope chain
    pub fn lookup(&self, name: &str) -> Option<Object> {
        match self.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref()?.borrow().lookup(name),
        }
    }

    /// Like [`Environment::lookup`], failing with `identifier not found`
    pub fn get(&self, name: &str) -> InterpResult<Object> {
        self.lookup(name)
            .ok_or_else(|| RuntimeError::identifier_not_found(name))
    }

    /// Check if a name is bound anywhere in the scope chain
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
            || self
                .outer
                .as_ref()
                .is_some_and(|outer| outer.borrow().contains(name))
    }

    /// Bindings of this scope only
    pub fn bindings(&self) -> &HashMap<String, Object> {
        &self.bindings
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

/// Create a child environment from an outer reference
pub fn child_env(outer: &EnvRef) -> EnvRef {
    Environment::new_enclosed(Rc::clone(outer)).into_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_of(env: &Environment, name: &str) -> Option<i64> {
        match env.lookup(name) {
            Some(Object::Integer(n)) => Some(n),
            _ => None,
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut env = Environment::new();
        let bound = env.set("x", Object::Integer(42));
        assert_eq!(bound.inspect(), "42");
        assert_eq!(int_of(&env, "x"), Some(42));
        assert!(env.lookup("y").is_none());
    }

    #[test]
    fn test_get_missing_is_error() {
        let env = Environment::new();
        let err = env.get("nope").unwrap_err();
        assert_eq!(err.message, "identifier not found: nope");
    }

    #[test]
    fn test_scope_chain() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().set("x", Object::Integer(1));

        let inner = child_env(&outer);
        inner.borrow_mut().set("y", Object::Integer(2));

        // Inner scope sees outer bindings
        assert_eq!(int_of(&inner.borrow(), "x"), Some(1));
        assert_eq!(int_of(&inner.borrow(), "y"), Some(2));

        // Outer scope cannot see inner bindings
        assert!(outer.borrow().lookup("y").is_none());
    }

    #[test]
    fn test_set_shadows_outer_binding() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().set("x", Object::Integer(1));

        let inner = child_env(&outer);
        inner.borrow_mut().set("x", Object::Integer(2));

        assert_eq!(int_of(&inner.borrow(), "x"), Some(2));
        assert_eq!(int_of(&outer.borrow(), "x"), Some(1));
    }

    #[test]
    fn test_contains_outer_chain() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().set("x", Object::Integer(1));

        let inner = child_env(&outer);
        assert!(inner.borrow().contains("x"));
        assert!(!inner.borrow().contains("y"));
        assert!(inner.borrow().bindings().is_empty());
    }

    #[test]
    fn test_outer_mutation_visible_through_chain() {
        let outer = Environment::new().into_ref();
        let inner = child_env(&outer);
        outer.borrow_mut().set("late", Object::Integer(7));
        assert_eq!(int_of(&inner.borrow(), "late"), Some(7));
    }

    #[test]
    fn test_clear() {
        let mut env = Environment::new();
        env.set("a", Object::Integer(1));
        env.set("b", Object::Integer(2));
        assert_eq!(env.bindings().len(), 2);
        env.clear();
        assert!(env.bindings().is_empty());
    }
}
