//! Variable lookup for `$(NAME)` expansion in double-quoted strings.
//!
//! The scanner never reads the process environment directly; it asks a
//! [`VariableLookup`] supplied through [`ParseOptions`](crate::ParseOptions).

use std::collections::HashMap;

/// Resolves variable names referenced by `$(NAME)`.
pub trait VariableLookup {
    /// Return the value of `name`, or `None` if it is not set.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Looks variables up in the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVariables;

impl VariableLookup for EnvVariables {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Resolves nothing; every reference expands to the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl VariableLookup for NoVariables {
    fn lookup(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Looks variables up in a fixed map.
#[derive(Debug, Clone, Default)]
pub struct MapVariables {
    variables: HashMap<String, String>,
}

impl MapVariables {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variable.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            variables: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl VariableLookup for MapVariables {
    fn lookup(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }
}
