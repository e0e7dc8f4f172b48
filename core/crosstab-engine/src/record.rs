//! FILENAME: core/crosstab-engine/src/record.rs
//! Source data for the cross table: loosely-typed values and key/value records.
//!
//! Records are schemaless. A field may be missing from one record and present
//! in the next, and the same field may hold numbers in some records and text
//! in others. Grouping and aggregation both tolerate that.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// VALUE
// ============================================================================

/// A single attribute value inside a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Arrays and objects. Kept as-is; grouped and coerced via their string form.
    Nested(serde_json::Value),
}

impl Value {
    /// Truthiness as used by the non-empty counters: `null`, `false`, `0`,
    /// `NaN` and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Nested(_) => true,
        }
    }

    /// Canonical string form. Sibling group nodes are keyed by this, so
    /// `Number(1.0)` and `Text("1")` select the same child.
    pub fn canonical_key(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::Text(s) => s.clone(),
            Value::Nested(json) => json_string_form(json),
        }
    }
}

/// String form of nested data: array elements joined by `,` (null elements
/// empty), objects as `[object Object]`.
fn json_string_form(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.as_f64().map(number_to_string).unwrap_or_default(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(json_string_form)
            .collect::<Vec<_>>()
            .join(","),
        serde_json::Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip rendering of a number, with `-0` folded into `0`.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// One source row: attribute name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: FxHashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            fields: FxHashMap::default(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Returns `None` when the attribute is absent. A present `Value::Null`
    /// is a different thing and is returned as such.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
