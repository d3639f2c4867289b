//! Identifier-keyed value maps used while resolving and in the resolved result.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::value::Value;

/// Values keyed by catalog identifier (or derived flag name).
///
/// Keys are `&'static str` because every key comes from the catalog or the
/// derivation table; raw user keys never end up here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values {
    entries: BTreeMap<&'static str, Value>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &'static str, value: Value) {
        self.entries.insert(id, value);
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.entries.get(id)
    }

    /// Boolean value of `id`; anything other than `true` reads as false
    pub fn flag(&self, id: &str) -> bool {
        self.get(id).and_then(Value::as_bool).unwrap_or(false)
    }

    /// String value of `id`, empty when absent or not a string
    pub fn text(&self, id: &str) -> &str {
        self.get(id).and_then(Value::as_str).unwrap_or("")
    }

    pub fn int(&self, id: &str) -> Option<i64> {
        self.get(id).and_then(Value::as_int)
    }

    /// Check whether choice option `id` currently holds `expected`
    pub fn is(&self, id: &str, expected: impl Into<&'static str>) -> bool {
        self.text(id) == expected.into()
    }

    /// Typed value of choice option `id`, falling back to the enum default
    pub fn choice<T: FromStr + Default>(&self, id: &str) -> T {
        self.text(id).parse().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
