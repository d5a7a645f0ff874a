//! Insertion-ordered JSON objects.
//!
//! [`OrderedMap`] stores string keys and JSON [`Value`]s in the order they
//! were first inserted. Decoding recovers the member order of every object in
//! the document, at any depth and inside arrays, and rejects objects that
//! repeat a member name. Encoding writes members back in key order.
//!
//! # Example
//!
//! ```
//! use json_ordered_map::{from_slice, to_string};
//!
//! let mut map = from_slice(br#"{"name":"demo","tags":["<a>"],"id":7}"#).unwrap();
//! assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name", "tags", "id"]);
//!
//! map.set("added", true);
//! map.delete("tags");
//! assert_eq!(to_string(&map), r#"{"name":"demo","id":7,"added":true}"#);
//!
//! map.sort_keys();
//! assert_eq!(map.get_key_at(0).unwrap(), "added");
//!
//! assert!(from_slice(br#"{"a":1,"a":2}"#).unwrap_err().is_duplicate_key());
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod limits;
pub mod map;
pub mod pair;
pub mod scan;
mod serde_impls;
pub mod token;
pub mod value;

pub use decoder::{
    from_slice, from_slice_with_limits, from_str, value_from_slice, value_from_slice_with_limits,
    value_from_str,
};
pub use encoder::{
    to_string, to_vec, to_vec_with_options, value_to_string, value_to_vec, EncodeOptions, Encoder,
};
pub use error::{JsonError, Result};
pub use limits::{Limits, DEFAULT_MAX_DEPTH};
pub use map::OrderedMap;
pub use pair::{by_less, Pair};
pub use scan::{check_duplicates, check_duplicates_with_limits, check_reader};
pub use token::{Token, TokenReader};
pub use value::Value;
