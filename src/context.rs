//! Runtime scope stack.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::trace;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub value: Value,
    pub mutable: bool,
}

type Scope = HashMap<String, Binding>;

/// Why `Context::assign` refused a rebinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    /// The name is bound but was not declared `mut`.
    Immutable,
    /// The name is not bound in any scope.
    Undefined,
}

/// Stack of scopes, innermost last.
///
/// Lookups walk from the innermost scope outwards so inner bindings shadow
/// outer ones.  Declaring a name twice in the same scope is refused.
#[derive(Debug, Default)]
pub struct Context {
    scopes: Vec<Scope>,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::new());
        trace!(depth = self.depth(), "pushed scope");
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
        trace!(depth = self.depth(), "popped scope");
    }

    /// Binds `name` in the innermost scope.
    ///
    /// Returns false, leaving the scope untouched, if the innermost scope
    /// already binds `name` or if there is no scope at all.
    pub fn declare(&mut self, name: &str, value: Value, mutable: bool) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        match scope.entry(name.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(Binding { value, mutable });
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.binding(name).map(|b| &b.value)
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Rebinds `name` in the innermost scope that binds it.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let binding = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
            .ok_or(AssignError::Undefined)?;
        if !binding.mutable {
            return Err(AssignError::Immutable);
        }
        binding.value = value;
        Ok(())
    }
}
