//! Named parameter bag.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::value::Value;

/// Placeholder name → bound value.
///
/// Every fragment (field, condition, clause) carries its own bag; rendering a
/// statement merges them into one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Create a bag holding a single binding.
    pub fn single(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut params = Self::new();
        params.insert(name, value);
        params
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Bind a value, returning the previous one if the name was taken.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Merge another bag into this one (last write wins).
    ///
    /// Returns the names that were already bound to a *different* value.
    pub fn merge(&mut self, other: &Params) -> Vec<String> {
        let mut conflicts = Vec::new();
        for (name, value) in &other.0 {
            if let Some(prev) = self.0.insert(name.clone(), value.clone()) {
                if &prev != value {
                    conflicts.push(name.clone());
                }
            }
        }
        conflicts
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl std::ops::Index<&str> for Params {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        &self.0[name]
    }
}
