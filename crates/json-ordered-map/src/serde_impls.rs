//! `serde` support for [`OrderedMap`] and [`Value`].
//!
//! Serialization writes members in key order. Deserialization keeps the
//! order the format delivers entries in and rejects repeated names, so an
//! `OrderedMap` field inside a `#[derive(Deserialize)]` struct behaves like
//! [`from_slice`](crate::from_slice) when read through `serde_json`.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Number;

use crate::map::OrderedMap;
use crate::value::Value;

// Upper bound on preallocation from an untrusted size hint.
const MAX_PREALLOC: usize = 4096;

impl Serialize for OrderedMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => arr.serialize(serializer),
            Value::Object(map) => map.serialize(serializer),
        }
    }
}

struct OrderedMapVisitor;

impl<'de> Visitor<'de> for OrderedMapVisitor {
    type Value = OrderedMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OrderedMap, A::Error> {
        let capacity = access.size_hint().unwrap_or(0).min(MAX_PREALLOC);
        let mut map = OrderedMap::with_capacity(capacity);
        while let Some(key) = access.next_key::<String>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format_args!("duplicate key {key:?}")));
            }
            let value: Value = access.next_value()?;
            map.set(key, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for OrderedMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let capacity = access.size_hint().unwrap_or(0).min(MAX_PREALLOC);
        let mut items = Vec::with_capacity(capacity);
        while let Some(item) = access.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Value, A::Error> {
        OrderedMapVisitor.visit_map(access).map(Value::Object)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[test]
    fn test_serialize_keeps_order() {
        let mut map = OrderedMap::new();
        map.set("z", 1);
        map.set("a", vec![Value::Null, Value::from("s")]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"z":1,"a":[null,"s"]}"#
        );
    }

    #[test]
    fn test_deserialize_keeps_order() {
        let map: OrderedMap = serde_json::from_str(r#"{"b":{"y":1,"x":2},"a":true}"#).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        let inner = map["b"].as_object().unwrap();
        assert_eq!(inner.keys().collect::<Vec<_>>(), vec!["y", "x"]);
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let err = serde_json::from_str::<OrderedMap>(r#"{"a":1,"a":2}"#).unwrap_err();
        assert!(err.to_string().starts_with(r#"duplicate key "a""#), "{err}");

        let err = serde_json::from_str::<Value>(r#"[{"k":{"q":1,"q":2}}]"#).unwrap_err();
        assert!(err.to_string().contains(r#"duplicate key "q""#), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_non_object() {
        assert!(serde_json::from_str::<OrderedMap>("[1]").is_err());
    }

    #[test]
    fn test_value_scalars() {
        let value: Value = serde_json::from_str(r#"[null,true,-1,2,0.5,"s"]"#).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::Null,
                Value::Bool(true),
                Value::from(-1),
                Value::from(2),
                Value::from(0.5),
                Value::from("s"),
            ])
        );
    }

    #[derive(Serialize, Deserialize)]
    struct Document {
        name: String,
        fields: OrderedMap,
    }

    #[test]
    fn test_derived_struct_field() {
        let doc: Document =
            serde_json::from_str(r#"{"name":"d","fields":{"k2":1,"k1":2}}"#).unwrap();
        assert_eq!(doc.name, "d");
        assert_eq!(doc.fields.keys().collect::<Vec<_>>(), vec!["k2", "k1"]);
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"name":"d","fields":{"k2":1,"k1":2}}"#
        );
    }
}
