//! Parser configuration.

use crate::vars::{EnvVariables, VariableLookup};

static ENV: EnvVariables = EnvVariables;

/// How the top level of a document is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMode {
    /// The document is exactly one value of any shape.
    Value,
    /// The document is a sequence of bare `key value` pairs.
    ImplicitObject,
}

impl RootMode {
    /// Map the boolean `root_is_value` flag of [`parse_value`](crate::parse_value).
    pub fn from_root_is_value(root_is_value: bool) -> Self {
        if root_is_value {
            RootMode::Value
        } else {
            RootMode::ImplicitObject
        }
    }
}

/// Options shared by every parse entry point.
#[derive(Clone, Copy)]
pub struct ParseOptions<'a> {
    /// Name reported in error locations.
    pub filename: Option<&'a str>,
    /// Source of `$(NAME)` expansions.
    pub variables: &'a dyn VariableLookup,
}

impl<'a> ParseOptions<'a> {
    /// Defaults: no filename, variables from the process environment.
    pub fn new() -> Self {
        Self {
            filename: None,
            variables: &ENV,
        }
    }

    pub fn with_filename(mut self, filename: &'a str) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn with_variables(mut self, variables: &'a dyn VariableLookup) -> Self {
        self.variables = variables;
        self
    }
}

impl Default for ParseOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}
