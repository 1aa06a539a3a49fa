//! hconfig: a human-friendly configuration language.
//!
//! hconfig documents are whitespace-delimited: `{ }` objects hold
//! `key value` pairs, `[ ]` arrays hold values, `#` starts a comment, and
//! `"..."` strings expand escapes and `$(NAME)` variables while `'...'`
//! strings are taken verbatim. Unquoted atoms are sniffed into `null`,
//! booleans and numbers, falling back to strings.
//!
//! # Parsing Pipeline
//!
//! 1. **Scanner**: Converts source text into a token vector, resolving
//!    quoting, escapes and variable references.
//!
//! 2. **Value Parser**: Recursively parses the tokens into [`Value`]s, with
//!    either a single value or an implicit object as the document root.
//!
//! 3. **Conf Normalizer** (conf mode only): Reads the root as a stream of
//!    entries and groups repeated keys under an optional [`Schema`].

mod conf;
mod encode;
mod error;
mod options;
mod parser;
mod scanner;
mod schema;
mod value;
mod vars;

use std::path::Path;

pub use conf::Entry;
pub use encode::{encode, Format};
pub use error::{ErrorKind, ParseContext, ParseError, Result};
pub use options::{ParseOptions, RootMode};
pub use scanner::{tokenize, Delim, QuoteKind, Token, TokenKind};
pub use schema::{Cardinality, PropType, Schema, SectionRule};
pub use value::{Object, Value};
pub use vars::{EnvVariables, MapVariables, NoVariables, VariableLookup};

use parser::Parser;

/// Parse an hconfig document.
///
/// With `root_is_value` the document must be exactly one value; otherwise it
/// is read as bare `key value` pairs forming an object. Variables expand from
/// the process environment.
///
/// # Example
///
/// ```
/// use hconfig::{parse_value, Value};
///
/// let value = parse_value("port 8080 host localhost", false).unwrap();
/// assert_eq!(value.get("port"), Some(&Value::Number(8080.0)));
/// ```
pub fn parse_value(input: &str, root_is_value: bool) -> Result<Value> {
    parse_value_with(
        input,
        RootMode::from_root_is_value(root_is_value),
        &ParseOptions::new(),
    )
}

/// Parse an hconfig document with explicit options.
pub fn parse_value_with(input: &str, mode: RootMode, options: &ParseOptions<'_>) -> Result<Value> {
    let ctx = ParseContext::new(options.filename);

    // Phase 1: Scan source into tokens
    let tokens = scanner::tokenize(input, &ctx, options.variables)?;

    // Phase 2: Parse tokens into a value
    let mut parser = Parser::new(&tokens, &ctx);
    match mode {
        RootMode::Value => parser.parse_single_value(),
        RootMode::ImplicitObject => parser.parse_implicit_object_root().map(Value::Object),
    }
}

/// Parse an hconfig document in conf mode.
///
/// # Example
///
/// ```
/// use hconfig::{parse_conf, Schema, SectionRule};
///
/// let schema = Schema::new().section("general", SectionRule::once());
/// let conf = parse_conf("general { port 8080 }", Some(&schema)).unwrap();
/// assert_eq!(conf["general"].get("port").and_then(|v| v.as_f64()), Some(8080.0));
/// ```
pub fn parse_conf(input: &str, schema: Option<&Schema>) -> Result<Object> {
    parse_conf_with(input, schema, &ParseOptions::new())
}

/// Parse an hconfig document in conf mode with explicit options.
pub fn parse_conf_with(
    input: &str,
    schema: Option<&Schema>,
    options: &ParseOptions<'_>,
) -> Result<Object> {
    let ctx = ParseContext::new(options.filename);

    // Phase 1: Scan source into tokens
    let tokens = scanner::tokenize(input, &ctx, options.variables)?;

    // Phase 2: Parse tokens into entries
    let entries = conf::parse_conf_entries(&mut Parser::new(&tokens, &ctx))?;

    // Phase 3: Group entries and apply the schema
    conf::normalize(entries, schema, &ctx)
}

/// Read and parse an hconfig file.
pub fn parse_file(path: impl AsRef<Path>, root_is_value: bool) -> Result<Value> {
    let path = path.as_ref();
    let input = read_source(path)?;
    let filename = path.display().to_string();
    parse_value_with(
        &input,
        RootMode::from_root_is_value(root_is_value),
        &ParseOptions::new().with_filename(&filename),
    )
}

/// Read and parse an hconfig file in conf mode.
pub fn parse_conf_file(path: impl AsRef<Path>, schema: Option<&Schema>) -> Result<Object> {
    let path = path.as_ref();
    let input = read_source(path)?;
    let filename = path.display().to_string();
    parse_conf_with(&input, schema, &ParseOptions::new().with_filename(&filename))
}

fn read_source(path: &Path) -> Result<String> {
    log::debug!("reading {}", path.display());
    std::fs::read_to_string(path).map_err(|e| ParseError::Io(path.display().to_string(), e))
}
