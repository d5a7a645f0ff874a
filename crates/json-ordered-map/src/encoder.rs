//! Compact JSON encoder that writes object members in key order.
//!
//! Output has no insignificant whitespace. `<`, `>` and `&` are written as-is
//! unless [`EncodeOptions::escape_html`] is set.

use std::fmt::{self, Write as _};

use serde_json::Number;

use crate::map::OrderedMap;
use crate::value::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Escape `<`, `>` and `&` as `\u003c`, `\u003e` and `\u0026`.
    pub escape_html: bool,
}

pub struct Encoder {
    out: String,
    options: EncodeOptions,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_options(EncodeOptions::default())
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    pub fn encode_map(&mut self, map: &OrderedMap) -> String {
        self.out.clear();
        self.write_map(map);
        std::mem::take(&mut self.out)
    }

    pub fn encode_value(&mut self, value: &Value) -> String {
        self.out.clear();
        self.write_value(value);
        std::mem::take(&mut self.out)
    }

    pub fn write_value(&mut self, value: &Value) {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(true) => self.out.push_str("true"),
            Value::Bool(false) => self.out.push_str("false"),
            Value::Number(n) => self.write_number(n),
            Value::String(s) => self.write_str(s),
            Value::Array(arr) => self.write_arr(arr),
            Value::Object(map) => self.write_map(map),
        }
    }

    pub fn write_number(&mut self, n: &Number) {
        // serde_json's Display is the JSON representation. Writing into a
        // String cannot fail.
        let _ = write!(self.out, "{n}");
    }

    pub fn write_str(&mut self, s: &str) {
        self.out.reserve(s.len() + 2);
        self.out.push('"');
        let mut last = 0;
        for (i, b) in s.bytes().enumerate() {
            let escaped = match b {
                b'"' => "\\\"",
                b'\\' => "\\\\",
                b'\n' => "\\n",
                b'\r' => "\\r",
                b'\t' => "\\t",
                0x08 => "\\b",
                0x0c => "\\f",
                0x00..=0x1f => "",
                b'<' if self.options.escape_html => "\\u003c",
                b'>' if self.options.escape_html => "\\u003e",
                b'&' if self.options.escape_html => "\\u0026",
                _ => continue,
            };
            // Every escaped byte is ASCII, so `last..i` is on char boundaries.
            self.out.push_str(&s[last..i]);
            if escaped.is_empty() {
                let _ = write!(self.out, "\\u{b:04x}");
            } else {
                self.out.push_str(escaped);
            }
            last = i + 1;
        }
        self.out.push_str(&s[last..]);
        self.out.push('"');
    }

    pub fn write_arr(&mut self, arr: &[Value]) {
        self.out.push('[');
        for (i, item) in arr.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_value(item);
        }
        self.out.push(']');
    }

    pub fn write_map(&mut self, map: &OrderedMap) {
        self.out.push('{');
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_str(key);
            self.out.push(':');
            self.write_value(value);
        }
        self.out.push('}');
    }
}

/// Encodes `map` as compact JSON, members in key order.
pub fn to_string(map: &OrderedMap) -> String {
    Encoder::new().encode_map(map)
}

pub fn to_vec(map: &OrderedMap) -> Vec<u8> {
    to_string(map).into_bytes()
}

pub fn to_vec_with_options(map: &OrderedMap, options: EncodeOptions) -> Vec<u8> {
    Encoder::with_options(options).encode_map(map).into_bytes()
}

pub fn value_to_string(value: &Value) -> String {
    Encoder::new().encode_value(value)
}

pub fn value_to_vec(value: &Value) -> Vec<u8> {
    value_to_string(value).into_bytes()
}

impl OrderedMap {
    /// Shorthand for [`to_vec`].
    pub fn to_json(&self) -> Vec<u8> {
        to_vec(self)
    }
}

impl fmt::Display for OrderedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&value_to_string(self))
    }
}
