// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value;

type Scope<'a> = HashMap<String, Cow<'a, Value>>;

/// Execution context threaded through rendering: the root model plus a stack
/// of name bindings. The innermost scope is the last element.
///
/// The stack never drops below the initial scope, which binds only `root`.
/// `this` exists once a loop has bound it.
#[derive(Debug)]
pub struct Context<'a> {
    root: &'a Value,
    scopes: Vec<Scope<'a>>,
}

impl<'a> Context<'a> {
    /// Creates a context for one render call over `root`.
    pub fn new(root: &'a Value) -> Self {
        let mut scope = Scope::new();
        scope.insert("root".to_string(), Cow::Borrowed(root));
        Self {
            root,
            scopes: vec![scope],
        }
    }

    /// The model the render call was started with.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Binds `name` in the innermost scope, replacing an earlier binding there.
    pub fn set(&mut self, name: impl Into<String>, value: Cow<'a, Value>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Opens a new, empty innermost scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Closes the innermost scope. The initial scope is never removed.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of open scopes, including the initial one.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Finds `name` searching from the innermost scope outwards.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.binding(name).map(|value| &**value)
    }

    /// Like [`lookup`](Self::lookup), but exposes whether the bound value is
    /// borrowed from the model for the whole render.
    pub fn binding(&self, name: &str) -> Option<&Cow<'a, Value>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}
