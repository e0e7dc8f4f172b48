//! FILENAME: core/crosstab-engine/src/stats.rs
//! Computed statistic values and the insertion-ordered maps that hold them.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::coerce::{text_to_number_or, to_fixed};
use crate::record::number_to_string;

// ============================================================================
// STAT VALUE
// ============================================================================

/// A final, displayable statistic. Built-in methods produce numbers; a
/// numeric format, an unsupported method or a failed format produce text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl StatValue {
    /// Numeric reading of the value. Formatted text such as `"13.00"` reads
    /// back as `13`; text with no numeric reading is `NaN`.
    pub fn as_number(&self) -> f64 {
        match self {
            StatValue::Number(n) => *n,
            StatValue::Text(s) => text_to_number_or(s, f64::NAN),
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, StatValue::Number(n) if n.is_nan())
    }

    /// Rounds a numeric value to `digits` decimals. Text cannot be rounded.
    pub(crate) fn fixed(&self, digits: f64) -> Option<StatValue> {
        match self {
            StatValue::Number(n) => to_fixed(*n, digits).ok().map(StatValue::Text),
            StatValue::Text(_) => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Number(n) => f.write_str(&number_to_string(*n)),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for StatValue {
    fn from(n: f64) -> Self {
        StatValue::Number(n)
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

impl From<String> for StatValue {
    fn from(s: String) -> Self {
        StatValue::Text(s)
    }
}

// ============================================================================
// NAMED MAP
// ============================================================================

/// A small map from display name to `V` that keeps insertion order.
/// Statistic lists are short, so lookups are linear.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMap<V> {
    entries: Vec<(String, V)>,
}

/// Final statistics of a node, keyed by display name.
pub type Stats = NamedMap<StatValue>;

impl<V> NamedMap<V> {
    pub fn new() -> Self {
        NamedMap { entries: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        NamedMap {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Inserts or replaces. A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        match self.get_mut(&name) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<V> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(n, _)| n.as_str())
    }

    pub(crate) fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.entries.get_mut(index).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for NamedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Into<String>, V> FromIterator<(S, V)> for NamedMap<V> {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut map = NamedMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for NamedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
