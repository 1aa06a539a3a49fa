//! Phase 1: Scanner
//!
//! The scanner converts raw source text into tokens. It performs:
//! - Whitespace and `#` comment skipping
//! - Splitting on the structural characters `{ } [ ]`
//! - Quoting: double quotes interpret escapes and expand `$(NAME)`,
//!   single quotes are verbatim, unquoted atoms are taken as written
//!
//! Numbers are not recognized here; the parser classifies unquoted atoms.

use crate::error::{ParseContext, ParseError, Result};
use crate::vars::VariableLookup;
use std::iter::Peekable;
use std::str::Chars;

/// Bracket family of a structural token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    /// `{` and `}`.
    Brace,
    /// `[` and `]`.
    Bracket,
}

impl Delim {
    pub fn open_char(self) -> char {
        match self {
            Delim::Brace => '{',
            Delim::Bracket => '[',
        }
    }

    pub fn close_char(self) -> char {
        match self {
            Delim::Brace => '}',
            Delim::Bracket => ']',
        }
    }
}

/// How an atom was quoted, and therefore which expansions were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    /// Bare text; no escapes, no expansion.
    Unquoted,
    /// `"..."`; escapes and `$(NAME)` already expanded.
    Double,
    /// `'...'`; verbatim.
    Single,
}

/// Token type in the scanner output.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Open(Delim),
    Close(Delim),
    Atom(String, QuoteKind),
    End,
}

/// A single token with its zero-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line_num: usize,
    pub col: usize,
}

impl Token {
    /// Text used for this token in error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Open(d) => d.open_char().to_string(),
            TokenKind::Close(d) => d.close_char().to_string(),
            TokenKind::Atom(text, QuoteKind::Unquoted) => text.clone(),
            TokenKind::Atom(text, QuoteKind::Double) => format!("\"{}\"", text),
            TokenKind::Atom(text, QuoteKind::Single) => format!("'{}'", text),
            TokenKind::End => "end of input".to_string(),
        }
    }
}

/// Returns `true` for characters that are tokens on their own.
pub fn is_structural(ch: char) -> bool {
    matches!(ch, '{' | '}' | '[' | ']')
}

/// Scan a whole source text. The result always ends with a `TokenKind::End`.
pub fn tokenize(
    source: &str,
    ctx: &ParseContext,
    variables: &dyn VariableLookup,
) -> Result<Vec<Token>> {
    let mut scanner = Scanner::new(source, ctx, variables);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token()?;
        let done = token.kind == TokenKind::End;
        tokens.push(token);
        if done {
            break;
        }
    }
    log::trace!("scanned {} tokens", tokens.len());
    Ok(tokens)
}

/// Cursor over source text producing one token at a time.
pub struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
    ctx: &'a ParseContext,
    variables: &'a dyn VariableLookup,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, ctx: &'a ParseContext, variables: &'a dyn VariableLookup) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 0,
            col: 0,
            ctx,
            variables,
        }
    }

    /// Produce the next token, advancing past it.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();
        let (line_num, col) = (self.line, self.col);

        let kind = match self.peek() {
            None => TokenKind::End,
            Some('{') => self.structural(TokenKind::Open(Delim::Brace)),
            Some('}') => self.structural(TokenKind::Close(Delim::Brace)),
            Some('[') => self.structural(TokenKind::Open(Delim::Bracket)),
            Some(']') => self.structural(TokenKind::Close(Delim::Bracket)),
            Some('"') => {
                self.bump();
                let text = self.scan_double_quoted(line_num, col)?;
                TokenKind::Atom(text, QuoteKind::Double)
            }
            Some('\'') => {
                self.bump();
                let text = self.scan_single_quoted(line_num, col)?;
                TokenKind::Atom(text, QuoteKind::Single)
            }
            Some(_) => TokenKind::Atom(self.scan_unquoted(), QuoteKind::Unquoted),
        };

        Ok(Token {
            kind,
            line_num,
            col,
        })
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn structural(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn error_here(&self, err: ParseError, line: usize, col: usize) -> ParseError {
        err.with_location(self.ctx, line, col)
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == '#' {
                self.skip_comment();
            } else {
                break;
            }
        }
    }

    /// A comment runs to the end of the line or the end of input.
    fn skip_comment(&mut self) {
        while let Some(ch) = self.bump() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Longest run of characters that are not whitespace, structural or `#`.
    fn scan_unquoted(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || is_structural(ch) || ch == '#' {
                break;
            }
            out.push(ch);
            self.bump();
        }
        out
    }

    /// Contents of a single-quoted atom, opening quote already consumed.
    fn scan_single_quoted(&mut self, line: usize, col: usize) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\'') => return Ok(out),
                Some(ch) => out.push(ch),
                None => {
                    return Err(self.error_here(
                        ParseError::UnterminatedString(String::new()),
                        line,
                        col,
                    ))
                }
            }
        }
    }

    /// Contents of a double-quoted atom, opening quote already consumed.
    fn scan_double_quoted(&mut self, line: usize, col: usize) -> Result<String> {
        let mut out = String::new();
        loop {
            let (here_line, here_col) = (self.line, self.col);
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => self.scan_escape(&mut out, here_line, here_col)?,
                Some('$') if self.peek() == Some('(') => {
                    self.bump();
                    self.expand_variable(&mut out, here_line, here_col)?;
                }
                Some(ch) => out.push(ch),
                None => {
                    return Err(self.error_here(
                        ParseError::UnterminatedString(String::new()),
                        line,
                        col,
                    ))
                }
            }
        }
    }

    /// Interpret one escape sequence, backslash already consumed.
    fn scan_escape(&mut self, out: &mut String, line: usize, col: usize) -> Result<()> {
        match self.bump() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('f') => out.push('\x0C'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => out.push(self.scan_unicode_escape(line, col)?),
            Some(_) => {
                return Err(self.error_here(ParseError::BadEscapedChar(String::new()), line, col))
            }
            None => {
                return Err(self.error_here(
                    ParseError::UnterminatedString(String::new()),
                    line,
                    col,
                ))
            }
        }
        Ok(())
    }

    /// Decode `XXXX` after `\u`. A high surrogate must be followed by a
    /// `\uXXXX` low surrogate; the pair decodes to one code point.
    fn scan_unicode_escape(&mut self, line: usize, col: usize) -> Result<char> {
        let high = self.read_hex4(line, col)?;
        let code = if (0xD800..=0xDBFF).contains(&high) {
            if self.bump() != Some('\\') || self.bump() != Some('u') {
                return Err(self.bad_unicode(line, col));
            }
            let low = self.read_hex4(line, col)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.bad_unicode(line, col));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };

        char::from_u32(code).ok_or_else(|| self.bad_unicode(line, col))
    }

    /// Read exactly four hex digits.
    fn read_hex4(&mut self, line: usize, col: usize) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            match self.bump().and_then(|c| c.to_digit(16)) {
                Some(digit) => code = code * 16 + digit,
                None => return Err(self.bad_unicode(line, col)),
            }
        }
        Ok(code)
    }

    fn bad_unicode(&self, line: usize, col: usize) -> ParseError {
        self.error_here(ParseError::BadUnicodeEscape(String::new()), line, col)
    }

    /// Expand `$(NAME)`, `$(` already consumed. Unset variables expand to
    /// the empty string.
    fn expand_variable(&mut self, out: &mut String, line: usize, col: usize) -> Result<()> {
        let mut name = String::new();
        loop {
            match self.peek() {
                Some(')') => {
                    self.bump();
                    break;
                }
                Some('"') | None => {
                    return Err(self.error_here(
                        ParseError::UnterminatedVariable(String::new()),
                        line,
                        col,
                    ))
                }
                Some(ch) => {
                    name.push(ch);
                    self.bump();
                }
            }
        }
        match self.variables.lookup(&name) {
            Some(value) => out.push_str(&value),
            None => log::debug!("variable $({}) is not set, expanding to \"\"", name),
        }
        Ok(())
    }
}
