//! Phase 3: Conf Normalizer
//!
//! In conf mode the top level is read as a stream of entries rather than as
//! a plain object:
//!
//! ```text
//! entry := KEY ( '{' OBJECT '}' | VALUE ( '{' OBJECT '}' )? )
//! ```
//!
//! An entry with a body is a *section* and renders as `{ name, ...body }`;
//! one without is a plain assignment. Repeated keys are kept apart until
//! [`normalize`] groups them, checking them against an optional [`Schema`].

use crate::error::{ParseContext, ParseError, Result};
use crate::parser::Parser;
use crate::scanner::Delim;
use crate::schema::{Cardinality, Schema, NAME_PROP};
use crate::value::{Object, Value};
use indexmap::IndexMap;

/// One top-level conf entry, before grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    /// `None` only when `{` follows the key directly.
    pub name: Option<Value>,
    /// `None` for plain assignments.
    pub body: Option<Object>,
    pub line_num: usize,
    pub col: usize,
}

impl Entry {
    pub fn is_section(&self) -> bool {
        self.body.is_some()
    }

    /// Render a section as `{ name, ...body }`. A body property called
    /// `name` replaces the section name.
    fn into_section_value(self) -> Value {
        let mut obj = Object::new();
        obj.insert(NAME_PROP.to_string(), self.name.unwrap_or(Value::Null));
        obj.extend(self.body.unwrap_or_default());
        Value::Object(obj)
    }
}

/// Parse the whole token stream as conf entries.
pub fn parse_conf_entries(parser: &mut Parser<'_>) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    while !parser.at_end() {
        let start = parser.peek();
        let key = parser.parse_key()?;

        let (name, body) = if parser.eat_open(Delim::Brace) {
            (None, Some(parser.parse_object()?))
        } else {
            let name = parser.parse_value()?;
            let body = if parser.eat_open(Delim::Brace) {
                Some(parser.parse_object()?)
            } else {
                None
            };
            (Some(name), body)
        };

        entries.push(Entry {
            key,
            name,
            body,
            line_num: start.line_num,
            col: start.col,
        });
    }
    log::debug!("parsed {} conf entries", entries.len());
    Ok(entries)
}

/// Group entries by key and apply the schema.
///
/// Without a schema every key is accepted and sections always render as
/// arrays, even for a single occurrence. With a schema, keys must be declared
/// (or covered by `"*"`), `once` sections render as a single object, and
/// declared `many` sections missing from the input render as empty arrays.
pub fn normalize(entries: Vec<Entry>, schema: Option<&Schema>, ctx: &ParseContext) -> Result<Object> {
    let mut groups: IndexMap<String, Vec<Entry>> = IndexMap::new();
    for entry in entries {
        groups.entry(entry.key.clone()).or_default().push(entry);
    }

    let mut out = Object::new();
    for (key, occurrences) in groups {
        let rule = match schema {
            Some(schema) => Some(schema.rule(&key).ok_or_else(|| {
                locate(ParseError::UnknownSection(key.clone(), String::new()), &occurrences[0], ctx)
            })?),
            None => None,
        };

        let sections = occurrences.iter().filter(|e| e.is_section()).count();
        if sections == 0 {
            let value = occurrences
                .into_iter()
                .last()
                .and_then(|e| e.name)
                .unwrap_or(Value::Null);
            out.insert(key, value);
            continue;
        }
        if sections != occurrences.len() {
            let culprit = occurrences
                .iter()
                .find(|e| !e.is_section())
                .unwrap_or(&occurrences[0]);
            return Err(locate(ParseError::MixedEntry(key, String::new()), culprit, ctx));
        }

        let cardinality = rule.map_or(Cardinality::Many, |r| r.cardinality);
        if cardinality == Cardinality::Once && occurrences.len() != 1 {
            return Err(locate(
                ParseError::Cardinality(key, occurrences.len(), String::new()),
                &occurrences[1],
                ctx,
            ));
        }

        let mut rendered = Vec::with_capacity(occurrences.len());
        for entry in occurrences {
            if let Some(rule) = rule {
                rule.validate(&entry, ctx)?;
            }
            rendered.push(entry.into_section_value());
        }

        let value = match cardinality {
            Cardinality::Once => rendered.pop().unwrap_or(Value::Null),
            Cardinality::Many => Value::Array(rendered),
        };
        out.insert(key, value);
    }

    if let Some(schema) = schema {
        for (key, rule) in schema.sections() {
            if out.contains_key(key) {
                continue;
            }
            match rule.cardinality {
                Cardinality::Once => {
                    return Err(ParseError::Cardinality(
                        key.to_string(),
                        0,
                        ctx.file_suffix(),
                    ))
                }
                Cardinality::Many => {
                    out.insert(key.to_string(), Value::Array(Vec::new()));
                }
            }
        }
    }

    Ok(out)
}

fn locate(err: ParseError, entry: &Entry, ctx: &ParseContext) -> ParseError {
    err.with_location(ctx, entry.line_num, entry.col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::tokenize;
    use crate::schema::{PropType, SectionRule};
    use crate::vars::NoVariables;

    fn entries(source: &str) -> Vec<Entry> {
        let ctx = ParseContext::new(None);
        let tokens = tokenize(source, &ctx, &NoVariables).unwrap();
        parse_conf_entries(&mut Parser::new(&tokens, &ctx)).unwrap()
    }

    fn conf(source: &str, schema: Option<&Schema>) -> Result<Object> {
        let ctx = ParseContext::new(None);
        normalize(entries(source), schema, &ctx)
    }

    fn section(pairs: &[(&str, Value)]) -> Value {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    #[test]
    fn test_entry_shapes() {
        let es = entries("a { x 1 } b name { y 2 } c value d [1 2] { }");
        assert_eq!(es.len(), 4);
        assert_eq!(es[0].name, None);
        assert!(es[0].is_section());
        assert_eq!(es[1].name, Some(Value::from("name")));
        assert!(es[1].is_section());
        assert_eq!(es[2].name, Some(Value::from("value")));
        assert!(!es[2].is_section());
        assert_eq!(
            es[3].name,
            Some(Value::Array(vec![Value::from(1), Value::from(2)]))
        );
        assert_eq!(es[3].body, Some(Object::new()));
    }

    #[test]
    fn test_entry_positions() {
        let es = entries("a 1\n  b { }");
        assert_eq!((es[1].line_num, es[1].col), (1, 2));
    }

    #[test]
    fn test_group_without_schema() {
        let out = conf("foo bar { baz 10 } foo no { baz 20 }", None).unwrap();
        assert_eq!(
            out["foo"],
            Value::Array(vec![
                section(&[("name", "bar".into()), ("baz", 10.into())]),
                section(&[("name", "no".into()), ("baz", 20.into())]),
            ])
        );
    }

    #[test]
    fn test_single_section_without_schema_is_array() {
        let out = conf("bar { a b }", None).unwrap();
        assert_eq!(
            out["bar"],
            Value::Array(vec![section(&[("name", Value::Null), ("a", "b".into())])])
        );
    }

    #[test]
    fn test_assignments_render_directly() {
        let out = conf("port 8080 host localhost port 9090", None).unwrap();
        assert_eq!(out["port"], Value::from(9090));
        assert_eq!(out["host"], Value::from("localhost"));
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, ["port", "host"]);
    }

    #[test]
    fn test_once_renders_object() {
        let schema = Schema::new().section("general", SectionRule::once());
        let out = conf("general { port 8080 }", Some(&schema)).unwrap();
        assert_eq!(
            out["general"],
            section(&[("name", Value::Null), ("port", 8080.into())])
        );
    }

    #[test]
    fn test_once_twice_is_violation() {
        let schema = Schema::new().section("general", SectionRule::once());
        let err = conf("general { port 8080 }\ngeneral { port 8081 }", Some(&schema)).unwrap_err();
        assert!(err.is_schema_violation());
        assert_eq!(
            err.to_string(),
            "Section \"general\" must appear exactly once, found 2 at 2:1"
        );
    }

    #[test]
    fn test_once_missing_is_violation() {
        let schema = Schema::new().section("general", SectionRule::once());
        let err = conf("", Some(&schema)).unwrap_err();
        assert!(matches!(err, ParseError::Cardinality(_, 0, _)));
    }

    #[test]
    fn test_many_missing_is_empty_array() {
        let schema = Schema::new().section("vhost", SectionRule::many());
        let out = conf("", Some(&schema)).unwrap();
        assert_eq!(out["vhost"], Value::Array(vec![]));
    }

    #[test]
    fn test_unknown_section() {
        let schema = Schema::new().section("general", SectionRule::once());
        let err = conf("general { } extra { }", Some(&schema)).unwrap_err();
        assert!(matches!(err, ParseError::UnknownSection(ref k, _) if k == "extra"));
    }

    #[test]
    fn test_unknown_property_and_wildcard() {
        let strict = Schema::new().section("foo", SectionRule::once().prop("a", PropType::Any));
        let err = conf("foo { a 1 b 2 }", Some(&strict)).unwrap_err();
        assert!(matches!(err, ParseError::UnknownProperty(_, ref p, _) if p == "b"));

        let open = Schema::new().section("foo", SectionRule::once().prop("*", PropType::Any));
        let out = conf("foo { a 10 b hello c true }", Some(&open)).unwrap();
        assert_eq!(
            out["foo"],
            section(&[
                ("name", Value::Null),
                ("a", 10.into()),
                ("b", "hello".into()),
                ("c", true.into()),
            ])
        );
    }

    #[test]
    fn test_string_property_type() {
        let schema = Schema::new().section("foo", SectionRule::many().prop("root", PropType::String));
        assert!(conf("foo { root /var/www }", Some(&schema)).is_ok());
        let err = conf("foo { root 10 }", Some(&schema)).unwrap_err();
        assert!(matches!(err, ParseError::PropertyType(..)));
    }

    #[test]
    fn test_name_required() {
        let schema =
            Schema::new().section("foo", SectionRule::once().prop(NAME_PROP, PropType::String));
        assert!(matches!(
            conf("foo {}", Some(&schema)),
            Err(ParseError::NameRequired(..))
        ));
        assert!(matches!(
            conf("foo '' {}", Some(&schema)),
            Err(ParseError::NameRequired(..))
        ));
        assert!(matches!(
            conf("foo 10 {}", Some(&schema)),
            Err(ParseError::NameRequired(..))
        ));
        assert!(conf("foo bar {}", Some(&schema)).is_ok());
    }

    #[test]
    fn test_mixed_entry() {
        let err = conf("foo 1 foo { }", None).unwrap_err();
        assert!(matches!(err, ParseError::MixedEntry(..)));
        assert!(err.is_schema_violation());
    }

    #[test]
    fn test_body_name_overrides() {
        let out = conf("foo bar { name baz }", None).unwrap();
        assert_eq!(
            out["foo"],
            Value::Array(vec![section(&[("name", "baz".into())])])
        );
    }

    #[test]
    fn test_assignment_ignores_cardinality() {
        let schema = Schema::new()
            .section("port", SectionRule::once())
            .section("vhost", SectionRule::many());
        let out = conf("port 1 port 2 vhost a { }", Some(&schema)).unwrap();
        assert_eq!(out["port"], Value::from(2));
        assert_eq!(out["vhost"].as_array().map(Vec::len), Some(1));
    }
}
