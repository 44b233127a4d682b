//! Streaming row parser for one line of an `arrayLines` response.
//!
//! Each response line must be a single flat JSON array of scalars. The
//! parser is a small state machine driven by push-style events
//! (`array_start`, `value`, `array_end`, `object_start`, `object_end`), so
//! it can reject structural violations eagerly without buffering a parse
//! tree. [`RowParser::parse`] drives the machine from a tokenizer
//! specialized to this grammar; general JSON documents are deliberately
//! not supported.

use crate::error::{DruidLinkError, Result};
use serde_json::Value;

/// Parser state for a single response line.
///
/// `Idle` until the row array opens, `Open` while values accumulate,
/// `Closed` once the array ends. `Closed` is terminal for the line.
#[derive(Debug)]
enum State {
    Idle,
    Open(Vec<Value>),
    Closed(Vec<Value>),
}

/// Push-event parser that accepts exactly one flat array of scalars.
///
/// Any event that violates the expected grammar resets the parser to its
/// initial state, so a caller never observes a partial row after an error.
/// Use a fresh parser (or [`RowParser::parse`]) per line.
#[derive(Debug)]
pub struct RowParser {
    state: State,
}

impl Default for RowParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RowParser {
    /// Create a parser in the initial state.
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Parse one response line into a row of scalar values.
    pub fn parse(line: &str) -> Result<Vec<Value>> {
        let mut parser = Self::new();
        let mut lexer = Lexer::new(line);
        // True when a separator must come before the next value.
        let mut expect_separator = false;
        // True when a separator was just consumed, to reject trailing commas.
        let mut after_separator = false;

        while let Some(token) = lexer.next_token()? {
            match token {
                Token::ArrayStart => {
                    // Once the row is closed the state machine reports the
                    // violation itself, so only enforce separators mid-row.
                    if expect_separator && !parser.is_closed() {
                        return Err(syntax_error("expected ',' between values"));
                    }
                    parser.array_start(None)?;
                    after_separator = false;
                }
                Token::ArrayEnd => {
                    if after_separator {
                        return Err(syntax_error("trailing ',' before end of array"));
                    }
                    parser.array_end(None)?;
                    expect_separator = true;
                    after_separator = false;
                }
                Token::ObjectStart => parser.object_start(None)?,
                Token::ObjectEnd => parser.object_end(None)?,
                Token::Comma => {
                    if parser.is_closed() {
                        return Err(syntax_error("content after end of row"));
                    }
                    if !expect_separator {
                        return Err(syntax_error("unexpected ','"));
                    }
                    expect_separator = false;
                    after_separator = true;
                }
                Token::Colon => return Err(syntax_error("unexpected ':'")),
                Token::Scalar(value) => {
                    if expect_separator && !parser.is_closed() {
                        return Err(syntax_error("expected ',' between values"));
                    }
                    parser.value(value, None)?;
                    expect_separator = true;
                    after_separator = false;
                }
            }
        }

        parser.finish()
    }

    /// Whether the row array has been closed.
    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed(_))
    }

    /// Event: an array opened, optionally under a key.
    ///
    /// Only valid in the initial state with no key; a second array (nested
    /// or duplicate) is a grammar violation.
    pub fn array_start(&mut self, key: Option<&str>) -> Result<()> {
        if key.is_some() {
            return Err(self.fail("Encountered unexpected key for an array"));
        }
        match self.state {
            State::Idle => {
                self.state = State::Open(Vec::new());
                Ok(())
            }
            State::Open(_) | State::Closed(_) => Err(self.fail("Row was already initialized")),
        }
    }

    /// Event: a scalar value arrived, optionally under a key.
    pub fn value(&mut self, value: Value, key: Option<&str>) -> Result<()> {
        if key.is_some() {
            return Err(self.fail("Encountered unexpected key for a value"));
        }
        match &mut self.state {
            State::Idle => Err(self.fail("Encountered value before array start")),
            State::Closed(_) => Err(self.fail("Row was already finished")),
            State::Open(row) => {
                row.push(value);
                Ok(())
            }
        }
    }

    /// Event: the array closed, optionally under a key.
    ///
    /// Freezes the accumulated row; no further values may be added.
    pub fn array_end(&mut self, key: Option<&str>) -> Result<()> {
        if key.is_some() {
            return Err(self.fail("Encountered unexpected key for an array"));
        }
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Open(row) => {
                self.state = State::Closed(row);
                Ok(())
            }
            State::Idle | State::Closed(_) => Err(self.fail("Row was already finished")),
        }
    }

    /// Event: an object opened. The row grammar admits no objects, so this
    /// always fails; an object here means the response is not tabular.
    pub fn object_start(&mut self, _key: Option<&str>) -> Result<()> {
        Err(self.fail("Encountered unexpected { in response"))
    }

    /// Event: an object closed. Always fails, as with [`Self::object_start`].
    pub fn object_end(&mut self, _key: Option<&str>) -> Result<()> {
        Err(self.fail("Encountered unexpected } in response"))
    }

    /// Consume the parser, returning the frozen row.
    pub fn finish(self) -> Result<Vec<Value>> {
        match self.state {
            State::Closed(row) => Ok(row),
            State::Open(_) => Err(syntax_error("unexpected end of input inside array")),
            State::Idle => Err(syntax_error("no row found on line")),
        }
    }

    /// Record a grammar violation, discarding any accumulated values so the
    /// caller never sees a partial row.
    fn fail(&mut self, message: &str) -> DruidLinkError {
        self.state = State::Idle;
        DruidLinkError::ResultUnparseable(message.to_string())
    }
}

fn syntax_error(message: impl Into<String>) -> DruidLinkError {
    DruidLinkError::ResultUnparseable(message.into())
}

/// Tokens produced by the line tokenizer.
#[derive(Debug)]
enum Token {
    ArrayStart,
    ArrayEnd,
    ObjectStart,
    ObjectEnd,
    Comma,
    Colon,
    Scalar(Value),
}

/// Tokenizer for a single response line.
///
/// Recognizes the five structural characters plus JSON scalars (strings
/// with full escape handling, numbers, `true`, `false`, `null`). Scalar
/// literal decoding is delegated to serde_json; everything structural is
/// handled here so nesting violations reach the state machine as events.
struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();
        let bytes = self.input.as_bytes();
        let Some(&b) = bytes.get(self.pos) else {
            return Ok(None);
        };
        match b {
            b'[' => {
                self.pos += 1;
                Ok(Some(Token::ArrayStart))
            }
            b']' => {
                self.pos += 1;
                Ok(Some(Token::ArrayEnd))
            }
            b'{' => {
                self.pos += 1;
                Ok(Some(Token::ObjectStart))
            }
            b'}' => {
                self.pos += 1;
                Ok(Some(Token::ObjectEnd))
            }
            b',' => {
                self.pos += 1;
                Ok(Some(Token::Comma))
            }
            b':' => {
                self.pos += 1;
                Ok(Some(Token::Colon))
            }
            b'"' => self.scan_string().map(Some),
            b't' => self.scan_keyword("true", Value::Bool(true)).map(Some),
            b'f' => self.scan_keyword("false", Value::Bool(false)).map(Some),
            b'n' => self.scan_keyword("null", Value::Null).map(Some),
            b'-' | b'0'..=b'9' => self.scan_number().map(Some),
            _ => {
                let ch = self.input[self.pos..].chars().next().unwrap_or('\u{fffd}');
                Err(syntax_error(format!(
                    "unexpected character {:?} at byte {}",
                    ch, self.pos
                )))
            }
        }
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while matches!(bytes.get(self.pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Scan a string literal. The scan only locates the closing quote
    /// (skipping escaped characters); decoding of escape sequences,
    /// including `\uXXXX` surrogate pairs, is left to serde_json.
    fn scan_string(&mut self) -> Result<Token> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = start + 1;
        loop {
            match bytes.get(i) {
                None => return Err(syntax_error("unterminated string literal")),
                Some(b'\\') => {
                    if bytes.get(i + 1).is_none() {
                        return Err(syntax_error("unterminated string literal"));
                    }
                    i += 2;
                }
                Some(b'"') => break,
                Some(_) => i += 1,
            }
        }
        let literal = &self.input[start..=i];
        self.pos = i + 1;
        let decoded: String = serde_json::from_str(literal)
            .map_err(|e| syntax_error(format!("invalid string literal: {}", e)))?;
        Ok(Token::Scalar(Value::String(decoded)))
    }

    fn scan_keyword(&mut self, keyword: &str, value: Value) -> Result<Token> {
        if self.input[self.pos..].starts_with(keyword) {
            self.pos += keyword.len();
            Ok(Token::Scalar(value))
        } else {
            Err(syntax_error(format!(
                "unexpected token at byte {}",
                self.pos
            )))
        }
    }

    fn scan_number(&mut self) -> Result<Token> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = start;
        while matches!(
            bytes.get(i),
            Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
        ) {
            i += 1;
        }
        let literal = &self.input[start..i];
        self.pos = i;
        let number: serde_json::Number = serde_json::from_str(literal)
            .map_err(|e| syntax_error(format!("invalid number literal {:?}: {}", literal, e)))?;
        Ok(Token::Scalar(Value::Number(number)))
    }
}
