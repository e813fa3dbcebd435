// File: src/interpreter/environment.rs
//
// Binding store for Mini-PL variables.
// The language has a single global scope, so the store is one flat map from
// name to the last value assigned to it. It lives for a whole run and is
// passed explicitly to every evaluation call.

use super::value::Value;
use crate::ast::ValueType;
use crate::errors::{find_closest_match, MiniPlError, SourceLocation};
use std::collections::HashMap;

/// Variable storage for one run
///
/// # Examples
///
/// ```ignore
/// let mut env = Environment::new();
/// env.declare("x".to_string(), Value::Int(10));
/// assert!(env.assign("x", Value::Int(20)));
/// assert_eq!(env.get("x"), Some(Value::Int(20)));
/// assert!(!env.assign("y", Value::Int(1)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { bindings: HashMap::new() }
    }

    /// Creates or overwrites a binding
    pub fn declare(&mut self, name: String, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Overwrites an existing binding; returns false if the name was never declared
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.bindings.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }

    /// Looks up a variable, failing with a suggestion when it was never declared
    pub fn lookup(&self, name: &str, location: &SourceLocation) -> Result<Value, Box<MiniPlError>> {
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        let mut error = MiniPlError::undefined_variable(name, location.clone());
        if let Some(closest) = find_closest_match(name, &self.names()) {
            error = error.with_suggestion(closest.to_string());
        }
        Err(Box::new(error))
    }

    /// Type of the value bound to a name, which is always its declared type
    pub fn type_of(&self, name: &str) -> Option<ValueType> {
        self.bindings.get(name).map(Value::value_type)
    }

    /// Declared types of all bound names
    pub fn declared_types(&self) -> HashMap<String, ValueType> {
        self.bindings.iter().map(|(name, value)| (name.clone(), value.value_type())).collect()
    }

    /// All bound names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_declare_then_assign() {
        let mut env = Environment::new();
        env.declare("x".to_string(), Value::Int(10));
        assert!(env.assign("x", Value::Int(20)));
        assert_eq!(env.get("x"), Some(Value::Int(20)));
        assert_eq!(env.type_of("x"), Some(ValueType::Int));
    }

    #[test]
    fn test_assign_undeclared_fails() {
        let mut env = Environment::new();
        assert!(!env.assign("y", Value::Int(1)));
        assert!(env.is_empty());
    }

    #[test]
    fn test_lookup_suggests_close_name() {
        let mut env = Environment::new();
        env.declare("counter".to_string(), Value::Int(0));
        let err = env.lookup("countr", &SourceLocation::new(3, 7)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedVariable);
        assert_eq!(err.suggestion.as_deref(), Some("counter"));
        assert_eq!(err.location, SourceLocation::new(3, 7));
    }

    #[test]
    fn test_clear_and_names() {
        let mut env = Environment::new();
        env.declare("b".to_string(), Value::Bool(true));
        env.declare("a".to_string(), Value::Str("s".to_string()));
        assert_eq!(env.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(env.len(), 2);
        env.clear();
        assert!(!env.contains("a"));
    }
}
