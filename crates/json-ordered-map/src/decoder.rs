//! Order-preserving JSON decoding.
//!
//! Decoding runs three passes over the same input:
//!
//! 1. [`check_duplicates`] rejects malformed input and repeated member names.
//! 2. `serde_json` decodes the input into an unordered value tree.
//! 3. A [`TokenReader`] walk recovers the member order of every object and
//!    moves each value out of the flat tree into an [`OrderedMap`] in that
//!    order.
//!
//! Nothing is returned unless all three passes succeed.
//!
//! Values always come from the flat tree. If the walk meets a repeated member
//! name, which the scan normally rules out, the value is the one serde_json
//! kept (the last occurrence) and the key moves to the end of the order.

use std::str::FromStr;

use serde::Deserialize;
use tracing::{trace, warn};

use crate::error::{JsonError, Result};
use crate::limits::Limits;
use crate::map::OrderedMap;
use crate::scan::check_duplicates_with_limits;
use crate::token::{Token, TokenReader};
use crate::value::Value;

/// Decodes a JSON object into an [`OrderedMap`].
///
/// # Errors
///
/// - [`JsonError::Syntax`] for malformed input.
/// - [`JsonError::DuplicateKey`] when any object repeats a member name.
/// - [`JsonError::NotAnObject`] when the top-level value is not an object.
///
/// # Example
///
/// ```
/// use json_ordered_map::from_slice;
///
/// let map = from_slice(br#"{"b":1,"a":{"z":true,"y":null}}"#).unwrap();
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
/// let inner = map.get("a").and_then(|v| v.as_object()).unwrap();
/// assert_eq!(inner.keys().collect::<Vec<_>>(), vec!["z", "y"]);
/// ```
pub fn from_slice(input: &[u8]) -> Result<OrderedMap> {
    from_slice_with_limits(input, Limits::default())
}

/// [`from_slice`] with explicit decoder limits.
///
/// # Errors
///
/// See [`from_slice`]; additionally the limit errors.
pub fn from_slice_with_limits(input: &[u8], limits: Limits) -> Result<OrderedMap> {
    match value_from_slice_with_limits(input, limits)? {
        Value::Object(map) => Ok(map),
        other => Err(JsonError::NotAnObject {
            found: other.type_name(),
        }),
    }
}

/// # Errors
///
/// See [`from_slice`].
pub fn from_str(input: &str) -> Result<OrderedMap> {
    from_slice(input.as_bytes())
}

/// Decodes any JSON value.
///
/// Scalars and arrays at the top level come back as the matching [`Value`]
/// variant; every object, at any depth, becomes a [`Value::Object`].
///
/// # Errors
///
/// As [`from_slice`], except that a non-object top level is accepted.
pub fn value_from_slice(input: &[u8]) -> Result<Value> {
    value_from_slice_with_limits(input, Limits::default())
}

/// # Errors
///
/// See [`value_from_slice`].
pub fn value_from_str(input: &str) -> Result<Value> {
    value_from_slice(input.as_bytes())
}

/// [`value_from_slice`] with explicit decoder limits.
///
/// # Errors
///
/// See [`value_from_slice`]; additionally the limit errors.
pub fn value_from_slice_with_limits(input: &[u8], limits: Limits) -> Result<Value> {
    check_duplicates_with_limits(input, limits)?;

    let mut de = serde_json::Deserializer::from_slice(input);
    // Nesting is already bounded by `limits.max_depth`.
    de.disable_recursion_limit();
    let flat = serde_json::Value::deserialize(&mut de)?;
    de.end()?;

    let mut reader = TokenReader::with_limits(input, limits)?;
    let first = reader.expect_token()?;
    let value = restore_value(&mut reader, first, Value::from(flat))?;
    reader.next_token()?;

    trace!(len = input.len(), kind = value.type_name(), "decoded JSON value");
    Ok(value)
}

/// Reorders the objects inside `current` to follow the token stream.
///
/// `current` holds the decoded values; tokens only contribute order. A
/// container token that disagrees with `current` is skipped and `current`
/// is kept as decoded.
fn restore_value<'a>(
    reader: &mut TokenReader<'a>,
    token: Token<'a>,
    current: Value,
) -> Result<Value> {
    match (token, current) {
        (Token::BeginObject, Value::Object(members)) => {
            restore_object(reader, members).map(Value::Object)
        }
        (Token::BeginArray, Value::Array(items)) => restore_array(reader, items).map(Value::Array),
        (token, current) => {
            reader.skip_value(&token)?;
            Ok(current)
        }
    }
}

fn restore_object<'a>(
    reader: &mut TokenReader<'a>,
    mut source: OrderedMap,
) -> Result<OrderedMap> {
    let mut map = OrderedMap::with_capacity(source.len());
    loop {
        let key = match reader.expect_token()? {
            Token::EndObject => break,
            Token::String(key) => key.into_owned(),
            other => {
                return Err(JsonError::TypeMismatch {
                    expected: "object key",
                    found: other.kind(),
                })
            }
        };
        let token = reader.expect_token()?;
        let current = if map.contains_key(&key) {
            // Unreachable after a successful duplicate scan. The decoded value
            // is the last occurrence's, and the key moves to the end.
            warn!(key = %key, "repeated object key during order recovery");
            map.move_to_end(&key);
            map.get_mut(&key).map(std::mem::take)
        } else {
            source.take(&key)
        };
        match current {
            Some(current) => {
                let value = restore_value(reader, token, current)?;
                map.set(key, value);
            }
            None => reader.skip_value(&token)?,
        }
    }
    // Members the walk never reached keep their decoded values.
    map.extend(source);
    Ok(map)
}

fn restore_array<'a>(reader: &mut TokenReader<'a>, mut items: Vec<Value>) -> Result<Vec<Value>> {
    let mut index = 0;
    loop {
        let token = reader.expect_token()?;
        if token == Token::EndArray {
            break;
        }
        match items.get_mut(index) {
            Some(item) => {
                let current = std::mem::take(item);
                *item = restore_value(reader, token, current)?;
            }
            None => reader.skip_value(&token)?,
        }
        index += 1;
    }
    Ok(items)
}

impl OrderedMap {
    /// Shorthand for [`from_slice`].
    ///
    /// # Errors
    ///
    /// See [`from_slice`].
    pub fn from_json(input: &[u8]) -> Result<Self> {
        from_slice(input)
    }
}

impl FromStr for OrderedMap {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self> {
        from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(map: &OrderedMap) -> Vec<&str> {
        map.keys().collect()
    }

    #[test]
    fn test_top_level_order() {
        let map = from_str(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        assert_eq!(keys(&map), vec!["z", "a", "m"]);
        assert_eq!(map.get("a"), Some(&Value::from(2)));
    }

    #[test]
    fn test_nested_object_order() {
        let map = from_str(r#"{"outer":{"c":1,"b":{"y":1,"x":2},"a":3}}"#).unwrap();
        let outer = map["outer"].as_object().unwrap();
        assert_eq!(keys(outer), vec!["c", "b", "a"]);
        assert_eq!(keys(outer["b"].as_object().unwrap()), vec!["y", "x"]);
    }

    #[test]
    fn test_objects_inside_arrays_are_ordered() {
        let map = from_str(r#"{"list":[{"b":1,"a":2},[{"d":1,"c":2}],3]}"#).unwrap();
        let list = map["list"].as_array().unwrap();
        assert_eq!(keys(list[0].as_object().unwrap()), vec!["b", "a"]);
        let nested = list[1].as_array().unwrap();
        assert_eq!(keys(nested[0].as_object().unwrap()), vec!["d", "c"]);
        assert_eq!(list[2], Value::from(3));
    }

    #[test]
    fn test_empty_object() {
        let map = from_str("{}").unwrap();
        assert_eq!(map.len(), 0);
        let map = from_str(" { } ").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        let map = from_str("{\n  \"b\" : [ 1 , 2 ] ,\n  \"a\" : null\n}\n").unwrap();
        assert_eq!(keys(&map), vec!["b", "a"]);
    }

    #[test]
    fn test_escaped_keys_are_unescaped() {
        let map = from_str(r#"{"é":1,"a\"b":2}"#).unwrap();
        assert_eq!(keys(&map), vec!["é", "a\"b"]);
    }

    #[test]
    fn test_duplicate_rejected_at_every_depth() {
        for input in [
            r#"{"a":1,"b":2,"a":3}"#,
            r#"{"x":{"a":1,"a":2}}"#,
            r#"{"x":[{"a":1,"a":2}]}"#,
        ] {
            assert_eq!(
                from_str(input),
                Err(JsonError::DuplicateKey("a".to_string())),
                "input {input}"
            );
        }
    }

    #[test]
    fn test_top_level_non_object() {
        assert_eq!(
            from_str("[1,2]"),
            Err(JsonError::NotAnObject { found: "array" })
        );
        assert_eq!(from_str("null"), Err(JsonError::NotAnObject { found: "null" }));
    }

    #[test]
    fn test_value_from_str_scalars_and_arrays() {
        assert_eq!(value_from_str("null").unwrap(), Value::Null);
        assert_eq!(value_from_str(" 12 ").unwrap(), Value::from(12));
        assert_eq!(value_from_str(r#""s""#).unwrap(), Value::from("s"));
        let arr = value_from_str(r#"[{"b":1,"a":2}]"#).unwrap();
        let first = arr.get_index(0).and_then(Value::as_object).unwrap();
        assert_eq!(keys(first), vec!["b", "a"]);
    }

    #[test]
    fn test_syntax_errors() {
        for input in ["", "{", r#"{"a":}"#, r#"{"a":1,}"#, "{} []", "{'a':1}", "{\"a\":1 /*c*/}"] {
            assert!(from_str(input).unwrap_err().is_syntax(), "input {input:?}");
        }
    }

    #[test]
    fn test_numbers_keep_their_form() {
        let map = from_str(r#"{"i":-3,"u":18446744073709551615,"f":1.5}"#).unwrap();
        assert_eq!(map["i"].as_i64(), Some(-3));
        assert_eq!(map["u"].as_u64(), Some(u64::MAX));
        assert_eq!(map["f"].as_f64(), Some(1.5));
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits::new().with_max_depth(2);
        assert!(from_slice_with_limits(br#"{"a":{"b":1}}"#, limits).is_ok());
        assert_eq!(
            from_slice_with_limits(br#"{"a":{"b":{}}}"#, limits),
            Err(JsonError::NestingTooDeep { depth: 3, max: 2 })
        );
    }

    #[test]
    fn test_from_str_trait_and_from_json() {
        let map: OrderedMap = r#"{"k":"v"}"#.parse().unwrap();
        assert_eq!(map["k"], Value::from("v"));
        assert_eq!(OrderedMap::from_json(br#"{"k":"v"}"#).unwrap(), map);
    }

    fn restore_unchecked(input: &[u8]) -> Value {
        let flat: serde_json::Value = serde_json::from_slice(input).unwrap();
        let mut reader = TokenReader::new(input).unwrap();
        let first = reader.expect_token().unwrap();
        let value = restore_value(&mut reader, first, Value::from(flat)).unwrap();
        assert_eq!(reader.next_token().unwrap(), None);
        value
    }

    #[test]
    fn test_repeated_key_keeps_last_value_and_moves_to_end() {
        let value = restore_unchecked(br#"{"a":1,"b":2,"a":{"x":[3]}}"#);
        let map = value.as_object().unwrap();
        assert_eq!(keys(map), vec!["b", "a"]);
        assert_eq!(map["a"].to_string(), r#"{"x":[3]}"#);
    }

    #[test]
    fn test_repeated_key_with_different_shapes() {
        let value = restore_unchecked(br#"{"a":{},"b":true,"a":1}"#);
        let map = value.as_object().unwrap();
        assert_eq!(keys(map), vec!["b", "a"]);
        assert_eq!(map["a"], Value::from(1));

        let value = restore_unchecked(br#"{"a":{"x":1,"z":2},"a":{"z":3,"y":4}}"#);
        let inner = value.get("a").and_then(Value::as_object).unwrap();
        assert_eq!(keys(inner), vec!["z", "y"]);
        assert_eq!(inner["z"], Value::from(3));
    }

    #[test]
    fn test_repeated_key_inside_array_element() {
        let value = restore_unchecked(br#"[{"k":[1],"j":0,"k":[{"b":1,"a":2}]}]"#);
        assert_eq!(
            value.to_string(),
            r#"[{"j":0,"k":[{"b":1,"a":2}]}]"#
        );
    }

    #[test]
    fn test_deep_nesting_within_raised_limit() {
        let depth = 150;
        let input = format!("{{\"a\":{}1{}}}", "[".repeat(depth), "]".repeat(depth));
        let map = from_slice_with_limits(input.as_bytes(), Limits::new().with_max_depth(200))
            .unwrap();
        let mut value = &map["a"];
        for _ in 0..depth {
            value = value.get_index(0).unwrap();
        }
        assert_eq!(value, &Value::from(1));
    }

    #[test]
    fn test_floats_round_trip_exactly() {
        for f in [
            0.1,
            1e-75,
            1.0715660391465826e-75,
            -1.603964615428183e143,
            f64::MAX,
            f64::MIN_POSITIVE,
            5e-324,
        ] {
            let mut map = OrderedMap::new();
            map.set("f", f);
            let back = from_slice(&map.to_json()).unwrap();
            assert_eq!(back["f"].as_f64(), Some(f), "value {f:e}");
        }
    }
}
