//! Streaming JSON token reader.
//!
//! Produces one [`Token`] at a time from a byte buffer, validating the full
//! RFC 8259 grammar as it goes. Commas, colons and whitespace are consumed
//! internally; object member names come back as [`Token::String`] followed by
//! the tokens of the member value.

use std::borrow::Cow;

use crate::error::{JsonError, Result};
use crate::limits::Limits;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    /// A string value or an object member name, already unescaped.
    String(Cow<'a, str>),
    /// The raw number text, grammar-checked but not converted.
    Number(&'a str),
    Bool(bool),
    Null,
}

impl Token<'_> {
    /// Short description used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::BeginObject => "object",
            Token::EndObject => "end of object",
            Token::BeginArray => "array",
            Token::EndArray => "end of array",
            Token::String(_) => "string",
            Token::Number(_) => "number",
            Token::Bool(_) => "boolean",
            Token::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Just after `{`: a member name or `}`.
    ObjectStart,
    /// After `,` inside an object: a member name.
    ObjectKey,
    /// After `"name":`: the member value.
    ObjectValue,
    /// After a member value: `,` or `}`.
    ObjectNext,
    /// Just after `[`: an element or `]`.
    ArrayStart,
    /// After `,` inside an array: an element.
    ArrayValue,
    /// After an element: `,` or `]`.
    ArrayNext,
}

pub struct TokenReader<'a> {
    input: &'a [u8],
    pos: usize,
    stack: Vec<Scope>,
    limits: Limits,
    done: bool,
}

impl<'a> TokenReader<'a> {
    /// # Errors
    ///
    /// Fails when `input` is not valid UTF-8.
    pub fn new(input: &'a [u8]) -> Result<Self> {
        Self::with_limits(input, Limits::default())
    }

    /// # Errors
    ///
    /// Fails when `input` is not valid UTF-8 or exceeds
    /// [`Limits::max_input_len`].
    pub fn with_limits(input: &'a [u8], limits: Limits) -> Result<Self> {
        if let Some(max) = limits.max_input_len {
            if input.len() > max {
                return Err(JsonError::InputTooLarge {
                    len: input.len(),
                    max,
                });
            }
        }
        if let Err(err) = std::str::from_utf8(input) {
            return Err(JsonError::syntax_at(
                input,
                err.valid_up_to(),
                "invalid UTF-8",
            ));
        }
        Ok(Self {
            input,
            pos: 0,
            stack: Vec::new(),
            limits,
            done: false,
        })
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of currently open objects and arrays.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether the innermost open object or array has another member.
    ///
    /// Returns `false` at the top level.
    pub fn more(&mut self) -> bool {
        self.skip_whitespace();
        match self.stack.last() {
            None => false,
            Some(Scope::ObjectStart) | Some(Scope::ArrayStart) => {
                !matches!(self.peek(), Some(b'}') | Some(b']') | None)
            }
            Some(Scope::ObjectNext) | Some(Scope::ArrayNext) => self.peek() == Some(b','),
            Some(_) => true,
        }
    }

    /// Reads the next token.
    ///
    /// Returns `Ok(None)` once a complete top-level value has been read and
    /// only whitespace remains.
    ///
    /// # Errors
    ///
    /// [`JsonError::Syntax`] on any grammar violation, including trailing
    /// content after the top-level value; [`JsonError::NestingTooDeep`] when
    /// [`Limits::max_depth`] is exceeded.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>> {
        self.skip_whitespace();
        match self.stack.last().copied() {
            None if self.done => match self.peek() {
                None => Ok(None),
                Some(_) => Err(self.error("trailing characters after top-level value")),
            },
            None => self.read_value().map(Some),
            Some(Scope::ObjectStart) => match self.peek() {
                Some(b'}') => self.close(Token::EndObject).map(Some),
                Some(b'"') => self.read_member_name().map(Some),
                Some(_) => Err(self.error("expected object key or '}'")),
                None => Err(self.eof()),
            },
            Some(Scope::ObjectKey) => match self.peek() {
                Some(b'"') => self.read_member_name().map(Some),
                Some(_) => Err(self.error("expected object key")),
                None => Err(self.eof()),
            },
            Some(Scope::ObjectNext) => match self.peek() {
                Some(b'}') => self.close(Token::EndObject).map(Some),
                Some(b',') => {
                    self.pos += 1;
                    self.set_top(Scope::ObjectKey);
                    self.next_token()
                }
                Some(_) => Err(self.error("expected ',' or '}' after object member")),
                None => Err(self.eof()),
            },
            Some(Scope::ArrayStart) => match self.peek() {
                Some(b']') => self.close(Token::EndArray).map(Some),
                Some(_) => self.read_value().map(Some),
                None => Err(self.eof()),
            },
            Some(Scope::ArrayNext) => match self.peek() {
                Some(b']') => self.close(Token::EndArray).map(Some),
                Some(b',') => {
                    self.pos += 1;
                    self.set_top(Scope::ArrayValue);
                    self.next_token()
                }
                Some(_) => Err(self.error("expected ',' or ']' after array element")),
                None => Err(self.eof()),
            },
            Some(Scope::ObjectValue) | Some(Scope::ArrayValue) => self.read_value().map(Some),
        }
    }

    /// Like [`next_token`](Self::next_token), but end of input is an error.
    ///
    /// # Errors
    ///
    /// As `next_token`, plus [`JsonError::Syntax`] at end of input.
    pub fn expect_token(&mut self) -> Result<Token<'a>> {
        match self.next_token()? {
            Some(token) => Ok(token),
            None => Err(self.eof()),
        }
    }

    /// Consumes the remainder of a value whose first token is `first`.
    ///
    /// # Errors
    ///
    /// Propagates reader errors from the skipped tokens.
    pub fn skip_value(&mut self, first: &Token<'a>) -> Result<()> {
        let base = match first {
            Token::BeginObject | Token::BeginArray => self.depth() - 1,
            _ => return Ok(()),
        };
        while self.depth() > base {
            self.expect_token()?;
        }
        Ok(())
    }

    fn read_value(&mut self) -> Result<Token<'a>> {
        let token = match self.peek() {
            Some(b'{') => return self.open(Scope::ObjectStart, Token::BeginObject),
            Some(b'[') => return self.open(Scope::ArrayStart, Token::BeginArray),
            Some(b'"') => Token::String(self.read_string()?),
            Some(b'-') | Some(b'0'..=b'9') => Token::Number(self.read_number()?),
            Some(b't') => {
                self.read_literal(b"true")?;
                Token::Bool(true)
            }
            Some(b'f') => {
                self.read_literal(b"false")?;
                Token::Bool(false)
            }
            Some(b'n') => {
                self.read_literal(b"null")?;
                Token::Null
            }
            Some(_) => return Err(self.error("expected value")),
            None => return Err(self.eof()),
        };
        self.value_done();
        Ok(token)
    }

    fn read_member_name(&mut self) -> Result<Token<'a>> {
        let name = self.read_string()?;
        self.skip_whitespace();
        match self.peek() {
            Some(b':') => self.pos += 1,
            Some(_) => return Err(self.error("expected ':' after object key")),
            None => return Err(self.eof()),
        }
        self.set_top(Scope::ObjectValue);
        Ok(Token::String(name))
    }

    fn open(&mut self, scope: Scope, token: Token<'a>) -> Result<Token<'a>> {
        if self.stack.len() >= self.limits.max_depth {
            return Err(JsonError::NestingTooDeep {
                depth: self.stack.len() + 1,
                max: self.limits.max_depth,
            });
        }
        self.pos += 1;
        self.stack.push(scope);
        Ok(token)
    }

    fn close(&mut self, token: Token<'a>) -> Result<Token<'a>> {
        self.pos += 1;
        self.stack.pop();
        self.value_done();
        Ok(token)
    }

    /// Marks the value in the enclosing scope as complete.
    fn value_done(&mut self) {
        match self.stack.last().copied() {
            None => self.done = true,
            Some(Scope::ObjectValue) => self.set_top(Scope::ObjectNext),
            Some(_) => self.set_top(Scope::ArrayNext),
        }
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn read_string(&mut self) -> Result<Cow<'a, str>> {
        let input = self.input;
        let start = self.pos + 1;
        let mut x = start;
        let mut escaped = false;
        loop {
            match input.get(x) {
                None => {
                    self.pos = x;
                    return Err(self.eof());
                }
                Some(b'"') => break,
                Some(b'\\') => {
                    escaped = true;
                    match input.get(x + 1) {
                        Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => x += 2,
                        Some(b'u') => {
                            let hex = input.get(x + 2..x + 6);
                            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                                self.pos = x;
                                return Err(self.error("invalid unicode escape"));
                            }
                            x += 6;
                        }
                        Some(_) => {
                            self.pos = x;
                            return Err(self.error("invalid escape sequence"));
                        }
                        None => {
                            self.pos = x + 1;
                            return Err(self.eof());
                        }
                    }
                }
                Some(&b) if b < 0x20 => {
                    self.pos = x;
                    return Err(self.error("control character in string"));
                }
                Some(_) => x += 1,
            }
        }
        let body = &input[start..x];
        self.pos = x + 1;
        if !escaped {
            // Input was validated as UTF-8 on construction and `"` is never a
            // continuation byte, so the slice is on character boundaries.
            return std::str::from_utf8(body)
                .map(Cow::Borrowed)
                .map_err(|_| self.error("invalid UTF-8"));
        }
        // Escapes (including surrogate pairing) are decoded by serde_json.
        serde_json::from_slice::<String>(&input[start - 1..=x])
            .map(Cow::Owned)
            .map_err(|err| match JsonError::from(err) {
                JsonError::Syntax { message, .. } => JsonError::syntax_at(input, start - 1, message),
                other => other,
            })
    }

    fn read_number(&mut self) -> Result<&'a str> {
        let input = self.input;
        let start = self.pos;
        let mut x = start;
        if input.get(x) == Some(&b'-') {
            x += 1;
        }
        match input.get(x) {
            Some(b'0') => x += 1,
            Some(b'1'..=b'9') => {
                while input.get(x).is_some_and(u8::is_ascii_digit) {
                    x += 1;
                }
            }
            _ => {
                self.pos = x;
                return Err(self.error("expected digit"));
            }
        }
        if input.get(x) == Some(&b'.') {
            x += 1;
            if !input.get(x).is_some_and(u8::is_ascii_digit) {
                self.pos = x;
                return Err(self.error("expected digit after decimal point"));
            }
            while input.get(x).is_some_and(u8::is_ascii_digit) {
                x += 1;
            }
        }
        if matches!(input.get(x), Some(b'e' | b'E')) {
            x += 1;
            if matches!(input.get(x), Some(b'+' | b'-')) {
                x += 1;
            }
            if !input.get(x).is_some_and(u8::is_ascii_digit) {
                self.pos = x;
                return Err(self.error("expected digit in exponent"));
            }
            while input.get(x).is_some_and(u8::is_ascii_digit) {
                x += 1;
            }
        }
        self.pos = x;
        std::str::from_utf8(&input[start..x]).map_err(|_| self.error("invalid number"))
    }

    fn read_literal(&mut self, literal: &'static [u8]) -> Result<()> {
        let end = self.pos + literal.len();
        if self.input.get(self.pos..end) != Some(literal) {
            return Err(self.error("invalid literal"));
        }
        self.pos = end;
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> JsonError {
        JsonError::syntax_at(self.input, self.pos, message)
    }

    fn eof(&self) -> JsonError {
        JsonError::syntax_at(self.input, self.input.len(), "unexpected end of input")
    }
}
