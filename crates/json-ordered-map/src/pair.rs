//! Key/value snapshots handed to [`OrderedMap::sort`](crate::OrderedMap::sort)
//! comparators.

use std::cmp::Ordering;

use crate::value::Value;

/// A borrowed `(key, value)` entry, alive only for the duration of a sort.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair<'a> {
    key: &'a str,
    value: &'a Value,
}

impl<'a> Pair<'a> {
    pub fn new(key: &'a str, value: &'a Value) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }
}

/// Turns a less-than predicate into a three-way comparator.
///
/// `less` must be a strict weak ordering. Entries for which neither
/// `less(a, b)` nor `less(b, a)` holds compare equal and keep their relative
/// order, since the underlying sort is stable.
pub fn by_less<F>(mut less: F) -> impl FnMut(&Pair<'_>, &Pair<'_>) -> Ordering
where
    F: FnMut(&Pair<'_>, &Pair<'_>) -> bool,
{
    move |a: &Pair<'_>, b: &Pair<'_>| {
        if less(a, b) {
            Ordering::Less
        } else if less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_accessors() {
        let value = Value::from(1);
        let pair = Pair::new("a", &value);
        assert_eq!(pair.key(), "a");
        assert_eq!(pair.value(), &Value::from(1));
    }

    #[test]
    fn test_by_less() {
        let one = Value::from(1);
        let two = Value::from(2);
        let a = Pair::new("a", &one);
        let b = Pair::new("b", &two);
        let mut cmp = by_less(|x: &Pair<'_>, y: &Pair<'_>| x.value().as_i64() < y.value().as_i64());
        assert_eq!(cmp(&a, &b), Ordering::Less);
        assert_eq!(cmp(&b, &a), Ordering::Greater);
        assert_eq!(cmp(&a, &a), Ordering::Equal);
    }
}
