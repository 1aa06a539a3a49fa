//! Schemas for conf documents.
//!
//! A schema names the section keys a document may use, how many times each
//! may appear, and which properties a section body may carry. Callers supply
//! it either as data (a [`Value`] or hconfig text) or through the builder;
//! string tags are turned into the closed enums below on construction, and
//! unknown tags are rejected right there.

use crate::conf::Entry;
use crate::error::{ParseContext, ParseError, Result};
use crate::value::{Object, Value};
use indexmap::IndexMap;
use std::str::FromStr;

/// Key matching anything not listed explicitly, both for sections and props.
pub const WILDCARD: &str = "*";

/// Property constraining the section name.
pub const NAME_PROP: &str = "name";

/// How many times a section may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one occurrence; rendered as a single object.
    Once,
    /// Any number of occurrences; rendered as an array.
    Many,
}

impl Cardinality {
    pub fn as_str(self) -> &'static str {
        match self {
            Cardinality::Once => "once",
            Cardinality::Many => "many",
        }
    }
}

impl FromStr for Cardinality {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "once" => Ok(Cardinality::Once),
            "many" => Ok(Cardinality::Many),
            _ => Err(ParseError::InvalidSchema(format!(
                "unknown count \"{}\" (expected \"once\" or \"many\")",
                s
            ))),
        }
    }
}

/// Type class of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropType {
    Any,
    String,
}

impl PropType {
    pub fn as_str(self) -> &'static str {
        match self {
            PropType::Any => "any",
            PropType::String => "string",
        }
    }

    fn admits(self, value: &Value) -> bool {
        match self {
            PropType::Any => true,
            PropType::String => matches!(value, Value::String(_)),
        }
    }
}

impl FromStr for PropType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "any" => Ok(PropType::Any),
            "string" => Ok(PropType::String),
            _ => Err(ParseError::InvalidSchema(format!(
                "unknown property type \"{}\" (expected \"any\" or \"string\")",
                s
            ))),
        }
    }
}

/// Rule for one section key.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRule {
    pub cardinality: Cardinality,
    /// `None` admits every property.
    pub props: Option<IndexMap<String, PropType>>,
}

impl SectionRule {
    pub fn new(cardinality: Cardinality) -> Self {
        Self {
            cardinality,
            props: None,
        }
    }

    pub fn once() -> Self {
        Self::new(Cardinality::Once)
    }

    pub fn many() -> Self {
        Self::new(Cardinality::Many)
    }

    /// Declare a property. The first call switches the rule from "any
    /// property" to "listed properties only".
    pub fn prop(mut self, name: impl Into<String>, ty: PropType) -> Self {
        self.props
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), ty);
        self
    }

    /// Type of a body property, or `None` if the property is not allowed.
    pub fn prop_type(&self, prop: &str) -> Option<PropType> {
        match &self.props {
            None => Some(PropType::Any),
            Some(props) => props.get(prop).or_else(|| props.get(WILDCARD)).copied(),
        }
    }

    /// Check a section occurrence against this rule.
    pub(crate) fn validate(&self, entry: &Entry, ctx: &ParseContext) -> Result<()> {
        let Some(props) = &self.props else {
            return Ok(());
        };
        let located = |err: ParseError| err.with_location(ctx, entry.line_num, entry.col);

        if props.get(NAME_PROP) == Some(&PropType::String) {
            let named = matches!(&entry.name, Some(Value::String(s)) if !s.is_empty());
            if !named {
                return Err(located(ParseError::NameRequired(
                    entry.key.clone(),
                    String::new(),
                )));
            }
        }

        for (prop, value) in entry.body.iter().flatten() {
            let ty = self.prop_type(prop).ok_or_else(|| {
                located(ParseError::UnknownProperty(
                    entry.key.clone(),
                    prop.clone(),
                    String::new(),
                ))
            })?;
            if !ty.admits(value) {
                return Err(located(ParseError::PropertyType(
                    entry.key.clone(),
                    prop.clone(),
                    String::new(),
                )));
            }
        }
        Ok(())
    }

    fn from_record(key: &str, record: &Object) -> Result<Self> {
        let mut rule = SectionRule::many();
        for (field, value) in record {
            match field.as_str() {
                "count" => rule.cardinality = expect_tag(key, field, value)?.parse::<Cardinality>()?,
                "props" => {
                    let props = value.as_object().ok_or_else(|| {
                        ParseError::InvalidSchema(format!(
                            "\"props\" of section \"{}\" must be an object, got {}",
                            key,
                            value.type_name()
                        ))
                    })?;
                    let mut types = IndexMap::new();
                    for (prop, tag) in props {
                        types.insert(prop.clone(), expect_tag(key, prop, tag)?.parse::<PropType>()?);
                    }
                    rule.props = Some(types);
                }
                other => {
                    return Err(ParseError::InvalidSchema(format!(
                        "unknown field \"{}\" in section \"{}\" (expected \"count\" or \"props\")",
                        other, key
                    )))
                }
            }
        }
        Ok(rule)
    }
}

fn expect_tag<'v>(key: &str, field: &str, value: &'v Value) -> Result<&'v str> {
    value.as_str().ok_or_else(|| {
        ParseError::InvalidSchema(format!(
            "\"{}\" of section \"{}\" must be a string, got {}",
            field,
            key,
            value.type_name()
        ))
    })
}

/// Section rules keyed by section name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    sections: IndexMap<String, SectionRule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn section(mut self, key: impl Into<String>, rule: SectionRule) -> Self {
        self.insert(key, rule);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, rule: SectionRule) {
        self.sections.insert(key.into(), rule);
    }

    /// Rule for a section key, falling back to the `"*"` rule.
    pub fn rule(&self, key: &str) -> Option<&SectionRule> {
        self.sections
            .get(key)
            .or_else(|| self.sections.get(WILDCARD))
    }

    /// Explicitly declared sections, excluding the `"*"` fallback.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &SectionRule)> {
        self.sections
            .iter()
            .filter(|(key, _)| key.as_str() != WILDCARD)
            .map(|(key, rule)| (key.as_str(), rule))
    }

    /// Build a schema from data: an object mapping each section key to
    /// `"once"`, `"many"`, or `{ count: "once"|"many", props: { prop: "any"|"string" } }`.
    ///
    /// A record without `count` means `many`; a record without `props`
    /// admits every property.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            ParseError::InvalidSchema(format!(
                "schema must be an object of sections, got {}",
                value.type_name()
            ))
        })?;

        let mut schema = Schema::new();
        for (key, decl) in map {
            let rule = match decl {
                Value::String(tag) => SectionRule::new(tag.parse::<Cardinality>()?),
                Value::Object(record) => SectionRule::from_record(key, record)?,
                other => {
                    return Err(ParseError::InvalidSchema(format!(
                        "section \"{}\" must be \"once\", \"many\" or a record, got {}",
                        key,
                        other.type_name()
                    )))
                }
            };
            schema.insert(key.clone(), rule);
        }
        Ok(schema)
    }

    /// Read a schema written in hconfig as an implicit root object, e.g.
    ///
    /// ```text
    /// general once
    /// virtual-host { count many props { name string "*" any } }
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        Self::from_value(&crate::parse_value(input, false)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_from_value_literal_tags() {
        let data: Value = [("general", "once"), ("virtual-host", "many")]
            .into_iter()
            .collect();
        let schema = Schema::from_value(&data).unwrap();
        assert_eq!(schema.rule("general"), Some(&SectionRule::once()));
        assert_eq!(schema.rule("virtual-host"), Some(&SectionRule::many()));
        assert_eq!(schema.rule("other"), None);
    }

    #[test]
    fn test_parse_record_form() {
        let schema = Schema::parse(
            "foo { count once props { name string \"*\" any } }\nbar { props { port any } }",
        )
        .unwrap();
        let foo = schema.rule("foo").unwrap();
        assert_eq!(foo.cardinality, Cardinality::Once);
        assert_eq!(foo.prop_type("name"), Some(PropType::String));
        assert_eq!(foo.prop_type("anything"), Some(PropType::Any));
        let bar = schema.rule("bar").unwrap();
        assert_eq!(bar.cardinality, Cardinality::Many);
        assert_eq!(bar.prop_type("port"), Some(PropType::Any));
        assert_eq!(bar.prop_type("host"), None);
    }

    #[test]
    fn test_wildcard_section() {
        let schema = Schema::new()
            .section("general", SectionRule::once())
            .section(WILDCARD, SectionRule::many());
        assert_eq!(schema.rule("anything"), Some(&SectionRule::many()));
        let declared: Vec<&str> = schema.sections().map(|(k, _)| k).collect();
        assert_eq!(declared, ["general"]);
    }

    #[test]
    fn test_unknown_tags_rejected_eagerly() {
        for text in [
            "foo sometimes",
            "foo { count twice }",
            "foo { props { name number } }",
            "foo { cardinality once }",
            "foo 10",
            "foo { props [name] }",
        ] {
            let err = Schema::parse(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidSchema, "{}", text);
        }
        let err = Schema::from_value(&Value::from("once")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSchema);
    }

    #[test]
    fn test_builder_props() {
        let rule = SectionRule::once().prop(NAME_PROP, PropType::String);
        assert_eq!(rule.prop_type("name"), Some(PropType::String));
        assert_eq!(rule.prop_type("port"), None);
        assert_eq!(SectionRule::many().prop_type("port"), Some(PropType::Any));
    }
}
