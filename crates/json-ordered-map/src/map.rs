//! `OrderedMap`, a string-keyed map that remembers insertion order.
//!
//! Iteration, positional access and JSON encoding all follow the key order.
//! A key keeps its position when its value is overwritten; it only moves when
//! the map is explicitly sorted.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;

use crate::error::{JsonError, Result};
use crate::pair::{by_less, Pair};
use crate::value::Value;

static NULL: Value = Value::Null;

#[derive(Clone, Default)]
pub struct OrderedMap {
    entries: IndexMap<String, Value>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or updates `key`.
    ///
    /// A new key is appended at the end. An existing key keeps its position
    /// and its previous value is returned.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes `key`, shifting later keys down by one. No-op when absent.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + DoubleEndedIterator + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> + DoubleEndedIterator + '_ {
        self.entries.values()
    }

    pub fn values_mut(
        &mut self,
    ) -> impl ExactSizeIterator<Item = &mut Value> + DoubleEndedIterator + '_ {
        self.entries.values_mut()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> + DoubleEndedIterator + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(
        &mut self,
    ) -> impl ExactSizeIterator<Item = (&str, &mut Value)> + DoubleEndedIterator + '_ {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Position of `key` in the key order.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    /// # Errors
    ///
    /// [`JsonError::OutOfBounds`] when `index >= len()`.
    pub fn get_key_at(&self, index: usize) -> Result<&str> {
        self.entries
            .get_index(index)
            .map(|(k, _)| k.as_str())
            .ok_or(JsonError::OutOfBounds {
                index,
                len: self.len(),
            })
    }

    /// # Errors
    ///
    /// [`JsonError::OutOfBounds`] when `index >= len()`.
    pub fn get_value_at(&self, index: usize) -> Result<&Value> {
        self.entries
            .get_index(index)
            .map(|(_, v)| v)
            .ok_or(JsonError::OutOfBounds {
                index,
                len: self.len(),
            })
    }

    /// Reorders keys with `compare`. Values stay attached to their keys.
    pub fn sort_keys_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        self.entries
            .sort_by(|k1, _, k2, _| compare(k1.as_str(), k2.as_str()));
    }

    /// Sorts keys lexicographically by byte value.
    pub fn sort_keys(&mut self) {
        self.sort_keys_by(|a, b| a.cmp(b));
    }

    /// Reorders entries with a three-way comparator over `(key, value)` pairs.
    ///
    /// The sort is stable.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Pair<'_>, &Pair<'_>) -> Ordering,
    {
        self.entries
            .sort_by(|k1, v1, k2, v2| compare(&Pair::new(k1, v1), &Pair::new(k2, v2)));
    }

    /// Reorders entries with a less-than predicate over `(key, value)` pairs.
    ///
    /// `less` must define a strict weak ordering; ties keep their current
    /// relative order.
    pub fn sort<F>(&mut self, less: F)
    where
        F: FnMut(&Pair<'_>, &Pair<'_>) -> bool,
    {
        self.sort_by(by_less(less));
    }

    /// Read-only view of the underlying storage.
    pub fn as_index_map(&self) -> &IndexMap<String, Value> {
        &self.entries
    }

    /// Moves an existing key to the end of the key order.
    pub(crate) fn move_to_end(&mut self, key: &str) {
        if let Some(index) = self.entries.get_index_of(key) {
            let last = self.entries.len() - 1;
            self.entries.move_index(index, last);
        }
    }

    /// Removes `key` without preserving the order of the remaining keys.
    pub(crate) fn take(&mut self, key: &str) -> Option<Value> {
        self.entries.swap_remove(key)
    }
}

impl fmt::Debug for OrderedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equality takes key order into account.
impl PartialEq for OrderedMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for OrderedMap {}

/// Missing keys index to `Value::Null`, like `serde_json::Value`.
impl Index<&str> for OrderedMap {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OrderedMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = OrderedMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for OrderedMap {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl IntoIterator for OrderedMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a OrderedMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a mut OrderedMap {
    type Item = (&'a String, &'a mut Value);
    type IntoIter = indexmap::map::IterMut<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter_mut()
    }
}
