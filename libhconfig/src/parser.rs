//! Phase 2: Value Parser
//!
//! The value parser walks the token vector by recursive descent to build
//! values. It handles:
//! - Scalars: null, booleans, numbers, strings
//! - Compounds: arrays `[ ... ]` and objects `{ key value ... }`
//! - The two document roots: a single value, or an implicit object of bare
//!   `key value` pairs with no enclosing braces

use crate::error::{ParseContext, ParseError, Result};
use crate::scanner::{Delim, QuoteKind, Token, TokenKind};
use crate::value::{Object, Value};

/// Deepest nesting of arrays and objects a document may use.
pub const MAX_DEPTH: usize = 512;

static END: Token = Token {
    kind: TokenKind::End,
    line_num: 0,
    col: 0,
};

/// Cursor over a scanned token vector.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    ctx: &'t ParseContext,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token], ctx: &'t ParseContext) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            ctx,
        }
    }

    // ========================================================================
    // Roots
    // ========================================================================

    /// Parse the whole stream as exactly one value.
    pub fn parse_single_value(&mut self) -> Result<Value> {
        if self.at_end() {
            return Err(ParseError::NoValueFound(self.ctx.file_suffix()));
        }
        let value = self.parse_value()?;
        self.expect_end()?;
        Ok(value)
    }

    /// Parse the whole stream as bare `key value` pairs.
    pub fn parse_implicit_object_root(&mut self) -> Result<Object> {
        let mut obj = Object::new();
        while !self.at_end() {
            let key = self.parse_key()?;
            let value = self.parse_value()?;
            obj.insert(key, value);
        }
        Ok(obj)
    }

    /// Verify no content remains.
    fn expect_end(&self) -> Result<()> {
        let t = self.peek();
        if t.kind != TokenKind::End {
            return Err(self.error_at(ParseError::ExtraContent(String::new()), t));
        }
        Ok(())
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    pub(crate) fn peek(&self) -> &'t Token {
        self.tokens.get(self.pos).unwrap_or(&END)
    }

    /// Consume the current token. `End` is never consumed.
    pub(crate) fn advance(&mut self) -> &'t Token {
        let t = self.peek();
        if t.kind != TokenKind::End {
            self.pos += 1;
        }
        t
    }

    pub(crate) fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::End
    }

    /// Consume an opening token of the given kind if it is next.
    pub(crate) fn eat_open(&mut self, delim: Delim) -> bool {
        if self.peek().kind == TokenKind::Open(delim) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_at(&self, err: ParseError, t: &Token) -> ParseError {
        err.with_location(self.ctx, t.line_num, t.col)
    }

    fn unexpected(&self, t: &Token) -> ParseError {
        match t.kind {
            TokenKind::End => self.error_at(ParseError::UnexpectedEnd(String::new()), t),
            _ => self.error_at(ParseError::UnexpectedToken(t.describe(), String::new()), t),
        }
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Parse one value of any shape.
    pub(crate) fn parse_value(&mut self) -> Result<Value> {
        let t = self.advance();
        match &t.kind {
            TokenKind::Open(delim) => {
                if self.depth >= MAX_DEPTH {
                    return Err(self.error_at(ParseError::TooDeep(MAX_DEPTH, String::new()), t));
                }
                self.depth += 1;
                let value = match delim {
                    Delim::Brace => self.parse_object().map(Value::Object),
                    Delim::Bracket => self.parse_array().map(Value::Array),
                };
                self.depth -= 1;
                value
            }
            TokenKind::Atom(text, quote) => Ok(parse_scalar_atom(text, *quote)),
            TokenKind::Close(_) | TokenKind::End => Err(self.unexpected(t)),
        }
    }

    /// Parse an object key: any atom, taken as its text.
    pub(crate) fn parse_key(&mut self) -> Result<String> {
        let t = self.advance();
        match &t.kind {
            TokenKind::Atom(text, _) => Ok(text.clone()),
            _ => Err(self.unexpected(t)),
        }
    }

    /// Parse array items up to `]`, the `[` already consumed.
    pub(crate) fn parse_array(&mut self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Close(Delim::Bracket) => {
                    self.advance();
                    return Ok(items);
                }
                TokenKind::Close(Delim::Brace) | TokenKind::End => {
                    return Err(self.unexpected(self.peek()))
                }
                _ => items.push(self.parse_value()?),
            }
        }
    }

    /// Parse `key value` pairs up to `}`, the `{` already consumed.
    /// Repeated keys keep the last value.
    pub(crate) fn parse_object(&mut self) -> Result<Object> {
        let mut obj = Object::new();
        loop {
            match self.peek().kind {
                TokenKind::Close(Delim::Brace) => {
                    self.advance();
                    return Ok(obj);
                }
                TokenKind::End => return Err(self.unexpected(self.peek())),
                _ => {
                    let key = self.parse_key()?;
                    let value = self.parse_value()?;
                    obj.insert(key, value);
                }
            }
        }
    }
}

// ============================================================================
// Scalars
// ============================================================================

/// Classify an atom. Quoted atoms are always strings.
pub fn parse_scalar_atom(text: &str, quote: QuoteKind) -> Value {
    if quote != QuoteKind::Unquoted {
        return Value::String(text.to_string());
    }
    if let Some(v) = parse_keyword(text) {
        return v;
    }
    match classify_number(text) {
        Numeric::Literal(n) => Value::Number(n),
        Numeric::NotNumeric => Value::String(text.to_string()),
    }
}

/// Check if s is a keyword and return its value.
fn parse_keyword(s: &str) -> Option<Value> {
    match s {
        "null" => Some(Value::Null),
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}

/// Outcome of number sniffing on unquoted text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Literal(f64),
    NotNumeric,
}

/// Decide whether s is a number literal.
pub fn classify_number(s: &str) -> Numeric {
    if !is_number_pattern(s) {
        return Numeric::NotNumeric;
    }
    // Literals beyond f64 range stay text.
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Numeric::Literal(n),
        _ => Numeric::NotNumeric,
    }
}

/// Check if s matches `-?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?`.
fn is_number_pattern(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);

    let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
        Some(e_pos) => (&s[..e_pos], Some(&s[e_pos + 1..])),
        None => (s, None),
    };

    if let Some(exp) = exponent {
        let exp = exp.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(exp);
        if !is_digits(exp) {
            return false;
        }
    }

    // A second '.' lands in `after` and fails the digit check.
    match mantissa.split_once('.') {
        Some((before, after)) => {
            (is_digits(before) && (after.is_empty() || is_digits(after)))
                || (before.is_empty() && is_digits(after))
        }
        None => is_digits(mantissa),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
