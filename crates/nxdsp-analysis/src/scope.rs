//! A lexically scoped symbol table.

use std::collections::HashMap;

/// A name-to-value map with stack discipline per name.
///
/// `push` shadows any previous binding of the same name; `pop` restores it.
/// Every push must be matched by a pop on every control-flow path, so that
/// the scope is empty once a traversal has fully unwound.
#[derive(Clone, Debug, Default)]
pub struct Scope<T> {
    table: HashMap<String, Vec<T>>,
}

impl<T> Scope<T> {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Binds `name` to `value`, shadowing any existing binding.
    pub fn push(&mut self, name: impl Into<String>, value: T) {
        self.table.entry(name.into()).or_default().push(value);
    }

    /// Removes the innermost binding of `name`.
    ///
    /// Panics when `name` is not bound; an unmatched pop is a traversal bug.
    pub fn pop(&mut self, name: &str) {
        let entry = self
            .table
            .get_mut(name)
            .unwrap_or_else(|| panic!("pop of unbound name '{name}'"));
        entry.pop();
        if entry.is_empty() {
            self.table.remove(name);
        }
    }

    /// The innermost binding of `name`, if any.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.table.get(name).and_then(|stack| stack.last())
    }

    /// Returns `true` if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_get_pop() {
        let mut scope = Scope::new();
        assert!(scope.is_empty());
        scope.push("x", 1);
        assert_eq!(scope.get("x"), Some(&1));
        assert!(scope.contains("x"));
        scope.pop("x");
        assert!(scope.is_empty());
        assert_eq!(scope.get("x"), None);
    }

    #[test]
    fn shadowing_restores_outer_binding() {
        let mut scope = Scope::new();
        scope.push("x", 1);
        scope.push("x", 2);
        assert_eq!(scope.get("x"), Some(&2));
        scope.pop("x");
        assert_eq!(scope.get("x"), Some(&1));
        scope.pop("x");
        assert!(scope.is_empty());
    }

    #[test]
    #[should_panic(expected = "pop of unbound name")]
    fn unmatched_pop_panics() {
        let mut scope: Scope<i32> = Scope::new();
        scope.pop("y");
    }
}
