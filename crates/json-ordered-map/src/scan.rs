//! Duplicate object key detection.
//!
//! Generic JSON decoders resolve a repeated member name by letting the last
//! value win, and two decoders can disagree about which value that is. The
//! scanner turns any repeated name within one object into
//! [`JsonError::DuplicateKey`], at every nesting depth and inside arrays.
//!
//! Names are compared after unescaping, so `{"a":1,"\u0061":2}` is rejected.
//!
//! # Example
//!
//! ```
//! use json_ordered_map::check_duplicates;
//!
//! assert!(check_duplicates(br#"{"a":{"b":1},"c":[{"b":2}]}"#).is_ok());
//!
//! let err = check_duplicates(br#"[{"a":1,"a":2}]"#).unwrap_err();
//! assert_eq!(err.duplicate_key(), Some("a"));
//! ```

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::trace;

use crate::error::{JsonError, Result};
use crate::limits::Limits;
use crate::token::{Token, TokenReader};

/// Validates that no object in `input` repeats a member name.
///
/// The whole input must be one well-formed JSON value.
///
/// # Errors
///
/// [`JsonError::DuplicateKey`] for the first repeated name in document order,
/// or any error the token reader reports for malformed input.
pub fn check_duplicates(input: &[u8]) -> Result<()> {
    check_duplicates_with_limits(input, Limits::default())
}

/// [`check_duplicates`] with explicit decoder limits.
///
/// # Errors
///
/// See [`check_duplicates`].
pub fn check_duplicates_with_limits(input: &[u8], limits: Limits) -> Result<()> {
    let mut reader = TokenReader::with_limits(input, limits)?;
    check_reader(&mut reader)?;
    // The reader rejects trailing content; only end of input can remain.
    reader.next_token()?;
    trace!(len = input.len(), "duplicate key scan passed");
    Ok(())
}

/// Reads one value from `reader` and checks it for repeated member names.
///
/// The reader is left positioned just after the value, so this can validate
/// a single element of a larger document.
///
/// # Errors
///
/// See [`check_duplicates`].
pub fn check_reader(reader: &mut TokenReader<'_>) -> Result<()> {
    let first = reader.expect_token()?;
    scan_value(reader, first)
}

fn scan_value<'a>(reader: &mut TokenReader<'a>, token: Token<'a>) -> Result<()> {
    match token {
        Token::BeginObject => scan_object(reader),
        Token::BeginArray => loop {
            match reader.expect_token()? {
                Token::EndArray => return Ok(()),
                element => scan_value(reader, element)?,
            }
        },
        _ => Ok(()),
    }
}

fn scan_object<'a>(reader: &mut TokenReader<'a>) -> Result<()> {
    let mut seen: HashSet<Cow<'a, str>> = HashSet::new();
    loop {
        let key = match reader.expect_token()? {
            Token::EndObject => return Ok(()),
            Token::String(key) => key,
            other => {
                return Err(JsonError::TypeMismatch {
                    expected: "object key",
                    found: other.kind(),
                })
            }
        };
        if seen.contains(key.as_ref()) {
            return Err(JsonError::DuplicateKey(key.into_owned()));
        }
        seen.insert(key);
        let value = reader.expect_token()?;
        scan_value(reader, value)?;
    }
}
