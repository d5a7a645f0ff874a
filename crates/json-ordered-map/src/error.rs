//! Error type shared by the container, the token reader and the codec.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonError {
    /// Malformed JSON. Line and column are 1-based.
    #[error("syntax error at line {line} column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    /// An object contains the same member name twice at one nesting level.
    #[error("duplicate object key {0:?}")]
    DuplicateKey(String),
    #[error("index {index} out of bounds for map of length {len}")]
    OutOfBounds { index: usize, len: usize },
    /// The flat value tree and the token stream disagree during order
    /// reconstruction.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// The top-level value is not an object but an `OrderedMap` was requested.
    #[error("expected a JSON object at the top level, found {found}")]
    NotAnObject { found: &'static str },
    #[error("nesting depth {depth} exceeds limit {max}")]
    NestingTooDeep { depth: usize, max: usize },
    #[error("input of {len} bytes exceeds limit {max}")]
    InputTooLarge { len: usize, max: usize },
}

impl JsonError {
    /// Builds a syntax error from a byte offset into `input`.
    pub(crate) fn syntax_at(input: &[u8], offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(input, offset);
        JsonError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, JsonError::Syntax { .. })
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, JsonError::DuplicateKey(_))
    }

    /// The offending key when this is a [`JsonError::DuplicateKey`].
    pub fn duplicate_key(&self) -> Option<&str> {
        match self {
            JsonError::DuplicateKey(key) => Some(key),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for JsonError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json reports `line` 0 for errors that carry no position.
        let line = err.line().max(1);
        let column = err.column().max(1);
        // Strip the " at line N column M" suffix serde_json appends to Display.
        let text = err.to_string();
        let message = match text.rfind(" at line ") {
            Some(idx) => text[..idx].to_string(),
            None => text,
        };
        JsonError::Syntax {
            line,
            column,
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, JsonError>;

fn line_column(input: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let before = &input[..offset];
    let line = 1 + before.iter().filter(|&&b| b == b'\n').count();
    let column = match before.iter().rposition(|&b| b == b'\n') {
        Some(nl) => offset - nl,
        None => offset + 1,
    };
    (line, column)
}
