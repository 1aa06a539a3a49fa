//! Error types for hconfig parsing.

use thiserror::Error;

/// Result type for hconfig operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, line: usize, col: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", line + 1, col + 1, name),
            None => format!(" at {}:{}", line + 1, col + 1),
        }
    }

    /// Format a suffix naming only the file, for errors without a position.
    pub fn file_suffix(&self) -> String {
        match &self.filename {
            Some(name) => format!(" <{}>", name),
            None => String::new(),
        }
    }
}

/// Broad classification of a [`ParseError`].
///
/// Every error produced by this crate carries one of these markers, so callers
/// can tell a bad document from a bad schema or an unreadable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The text is not valid hconfig.
    Syntax,
    /// The document is valid hconfig but violates the supplied schema.
    Schema,
    /// The schema itself is malformed.
    InvalidSchema,
    /// A value cannot be written in the requested output format.
    Encode,
    /// The input could not be read.
    Io,
}

/// Error type for hconfig parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Quoted atom without a closing quote.
    #[error("Unterminated string{0}")]
    UnterminatedString(String),

    /// Unknown backslash escape in a double-quoted string.
    #[error("Bad escaped character{0}")]
    BadEscapedChar(String),

    /// Malformed `\uXXXX` escape.
    #[error("Bad Unicode escape{0}")]
    BadUnicodeEscape(String),

    /// `$(` without a closing parenthesis.
    #[error("Unterminated variable reference{0}")]
    UnterminatedVariable(String),

    /// Token that does not fit the grammar at this point.
    #[error("Unexpected \"{0}\"{1}")]
    UnexpectedToken(String, String),

    /// Input ended inside an array, object or pair.
    #[error("Unexpected end of input{0}")]
    UnexpectedEnd(String),

    /// Content after the root value.
    #[error("Unexpected extra content{0}")]
    ExtraContent(String),

    /// Arrays and objects nested past the parser's limit.
    #[error("Nesting deeper than {0} levels{1}")]
    TooDeep(usize, String),

    /// Document with nothing but whitespace and comments.
    #[error("No value found in document{0}")]
    NoValueFound(String),

    /// Section count does not match its cardinality.
    #[error("Section \"{0}\" must appear exactly once, found {1}{2}")]
    Cardinality(String, usize, String),

    /// Section key not covered by the schema.
    #[error("Unknown section \"{0}\"{1}")]
    UnknownSection(String, String),

    /// Property not covered by the section's props.
    #[error("Unknown property \"{1}\" in section \"{0}\"{2}")]
    UnknownProperty(String, String, String),

    /// Property declared as a string holds another kind of value.
    #[error("Property \"{1}\" in section \"{0}\" must be a string{2}")]
    PropertyType(String, String, String),

    /// Section requires a non-empty string name.
    #[error("Section \"{0}\" requires a non-empty string name{1}")]
    NameRequired(String, String),

    /// Key appears both as a plain assignment and as a section.
    #[error("Key \"{0}\" is used both as a value and as a section{1}")]
    MixedEntry(String, String),

    /// Malformed schema data.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Value with no representation in the output format.
    #[error("Cannot encode {0}")]
    Unencodable(String),

    /// Input file could not be read.
    #[error("Cannot read {0}: {1}")]
    Io(String, #[source] std::io::Error),
}

impl ParseError {
    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, line: usize, col: usize) -> Self {
        let suffix = ctx.loc_suffix(line, col);
        match self {
            ParseError::UnterminatedString(_) => ParseError::UnterminatedString(suffix),
            ParseError::BadEscapedChar(_) => ParseError::BadEscapedChar(suffix),
            ParseError::BadUnicodeEscape(_) => ParseError::BadUnicodeEscape(suffix),
            ParseError::UnterminatedVariable(_) => ParseError::UnterminatedVariable(suffix),
            ParseError::UnexpectedToken(tok, _) => ParseError::UnexpectedToken(tok, suffix),
            ParseError::UnexpectedEnd(_) => ParseError::UnexpectedEnd(suffix),
            ParseError::ExtraContent(_) => ParseError::ExtraContent(suffix),
            ParseError::TooDeep(limit, _) => ParseError::TooDeep(limit, suffix),
            ParseError::NoValueFound(_) => ParseError::NoValueFound(suffix),
            ParseError::Cardinality(key, found, _) => ParseError::Cardinality(key, found, suffix),
            ParseError::UnknownSection(key, _) => ParseError::UnknownSection(key, suffix),
            ParseError::UnknownProperty(key, prop, _) => {
                ParseError::UnknownProperty(key, prop, suffix)
            }
            ParseError::PropertyType(key, prop, _) => ParseError::PropertyType(key, prop, suffix),
            ParseError::NameRequired(key, _) => ParseError::NameRequired(key, suffix),
            ParseError::MixedEntry(key, _) => ParseError::MixedEntry(key, suffix),
            other => other,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnterminatedString(_)
            | ParseError::BadEscapedChar(_)
            | ParseError::BadUnicodeEscape(_)
            | ParseError::UnterminatedVariable(_)
            | ParseError::UnexpectedToken(..)
            | ParseError::UnexpectedEnd(_)
            | ParseError::ExtraContent(_)
            | ParseError::TooDeep(..)
            | ParseError::NoValueFound(_) => ErrorKind::Syntax,
            ParseError::Cardinality(..)
            | ParseError::UnknownSection(..)
            | ParseError::UnknownProperty(..)
            | ParseError::PropertyType(..)
            | ParseError::NameRequired(..)
            | ParseError::MixedEntry(..) => ErrorKind::Schema,
            ParseError::InvalidSchema(_) => ErrorKind::InvalidSchema,
            ParseError::Unencodable(_) => ErrorKind::Encode,
            ParseError::Io(..) => ErrorKind::Io,
        }
    }

    /// Returns `true` for errors caused by invalid hconfig text.
    pub fn is_syntax(&self) -> bool {
        self.kind() == ErrorKind::Syntax
    }

    /// Returns `true` for schema violations.
    pub fn is_schema_violation(&self) -> bool {
        self.kind() == ErrorKind::Schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loc_suffix() {
        assert_eq!(ParseContext::new(None).loc_suffix(0, 4), " at 1:5");
        assert_eq!(
            ParseContext::new(Some("site.hcnf")).loc_suffix(2, 0),
            " at 3:1 of <site.hcnf>"
        );
    }

    #[test]
    fn test_with_location_message() {
        let ctx = ParseContext::new(None);
        let err = ParseError::UnexpectedToken("}".into(), String::new()).with_location(&ctx, 1, 2);
        assert_eq!(err.to_string(), "Unexpected \"}\" at 2:3");
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_kind_markers() {
        assert!(ParseError::Cardinality("general".into(), 2, String::new()).is_schema_violation());
        assert!(!ParseError::InvalidSchema("bad".into()).is_schema_violation());
        assert_eq!(
            ParseError::Unencodable("NaN".into()).kind(),
            ErrorKind::Encode
        );
    }
}
