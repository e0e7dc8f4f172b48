//! FILENAME: core/crosstab-engine/src/definition.rs
//! Cross Table Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a cross table:
//! which attributes to group by and which statistics to compute.
//! These structures are designed to be:
//! - Serializable (built-in methods and numeric formats round-trip as JSON)
//! - Resolved once (a method tag is parsed when the spec is built, never per record)
//! - Extensible (custom statistics and formats are plain closures)

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CrossTabError, FormatFailure};
use crate::record::Record;
use crate::stats::{StatValue, Stats};

// ============================================================================
// STATISTIC METHODS
// ============================================================================

/// The fixed aggregation kinds computed from a node's running aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinMethod {
    /// Sum of coerced values.
    Sum,
    /// Number of records routed through the node.
    Count,
    /// `sum / count`.
    Avg,
    /// Number of records whose raw value is present and truthy.
    Count2,
    /// `sum / count2`.
    Avg2,
}

impl BuiltinMethod {
    pub const ALL: [BuiltinMethod; 5] = [
        BuiltinMethod::Sum,
        BuiltinMethod::Count,
        BuiltinMethod::Avg,
        BuiltinMethod::Count2,
        BuiltinMethod::Avg2,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            BuiltinMethod::Sum => "sum",
            BuiltinMethod::Count => "count",
            BuiltinMethod::Avg => "avg",
            BuiltinMethod::Count2 => "count2",
            BuiltinMethod::Avg2 => "avg2",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        BuiltinMethod::ALL.into_iter().find(|m| m.tag() == tag)
    }
}

impl FromStr for BuiltinMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinMethod::from_tag(s).ok_or_else(|| s.to_string())
    }
}

/// Signature of a custom statistic: the node's statistics computed so far
/// and the records routed through the node.
pub type CustomStatisticFn = dyn Fn(&Stats, &[&Record]) -> StatValue + Send + Sync;

/// A caller-supplied statistic, evaluated after all built-in statistics of
/// the same node.
#[derive(Clone)]
pub struct CustomStatistic(Arc<CustomStatisticFn>);

impl CustomStatistic {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Stats, &[&Record]) -> StatValue + Send + Sync + 'static,
    {
        CustomStatistic(Arc::new(f))
    }

    pub fn call(&self, stats: &Stats, members: &[&Record]) -> StatValue {
        (self.0)(stats, members)
    }
}

impl fmt::Debug for CustomStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomStatistic(..)")
    }
}

/// How a statistic is computed.
#[derive(Debug, Clone)]
pub enum StatMethod {
    Builtin(BuiltinMethod),
    /// A tag that names no built-in method. Evaluates to a visible
    /// `"not support <tag>"` text instead of failing.
    Unsupported(String),
    Custom(CustomStatistic),
}

impl StatMethod {
    /// Resolves a method tag once.
    pub fn from_tag(tag: &str) -> Self {
        match BuiltinMethod::from_tag(tag) {
            Some(method) => StatMethod::Builtin(method),
            None => StatMethod::Unsupported(tag.to_string()),
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Stats, &[&Record]) -> StatValue + Send + Sync + 'static,
    {
        StatMethod::Custom(CustomStatistic::new(f))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, StatMethod::Custom(_))
    }
}

impl From<BuiltinMethod> for StatMethod {
    fn from(method: BuiltinMethod) -> Self {
        StatMethod::Builtin(method)
    }
}

impl From<&str> for StatMethod {
    fn from(tag: &str) -> Self {
        StatMethod::from_tag(tag)
    }
}

impl Serialize for StatMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatMethod::Builtin(method) => serializer.serialize_str(method.tag()),
            StatMethod::Unsupported(tag) => serializer.serialize_str(tag),
            StatMethod::Custom(_) => Err(serde::ser::Error::custom(
                "custom statistic methods cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for StatMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(StatMethod::from_tag(&tag))
    }
}

// ============================================================================
// FORMATS
// ============================================================================

pub type FormatCallback = dyn Fn(&StatValue) -> Result<StatValue, FormatFailure> + Send + Sync;

/// A caller-supplied formatter for a computed statistic.
#[derive(Clone)]
pub struct FormatFn(Arc<FormatCallback>);

impl FormatFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&StatValue) -> Result<StatValue, FormatFailure> + Send + Sync + 'static,
    {
        FormatFn(Arc::new(f))
    }

    pub fn call(&self, value: &StatValue) -> Result<StatValue, FormatFailure> {
        (self.0)(value)
    }
}

impl fmt::Debug for FormatFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FormatFn(..)")
    }
}

/// How a computed statistic is rendered.
#[derive(Debug, Clone)]
pub enum StatFormat {
    /// Round to this many decimal places (truncated toward zero).
    Decimals(f64),
    /// Decimal places given as text; unparsable text means `0`.
    DecimalsText(String),
    Custom(FormatFn),
}

impl StatFormat {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&StatValue) -> Result<StatValue, FormatFailure> + Send + Sync + 'static,
    {
        StatFormat::Custom(FormatFn::new(f))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FormatRepr {
    Decimals(f64),
    Text(String),
}

impl Serialize for StatFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatFormat::Decimals(d) => serializer.serialize_f64(*d),
            StatFormat::DecimalsText(s) => serializer.serialize_str(s),
            StatFormat::Custom(_) => Err(serde::ser::Error::custom(
                "custom formats cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for StatFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match FormatRepr::deserialize(deserializer)? {
            FormatRepr::Decimals(d) => StatFormat::Decimals(d),
            FormatRepr::Text(s) => StatFormat::DecimalsText(s),
        })
    }
}

// ============================================================================
// STATISTIC SPEC
// ============================================================================

/// One statistic to compute at every node of the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticSpec {
    /// The record attribute fed into the running aggregate.
    pub source_field: String,

    /// Name of the statistic in every node's `stats` (must be unique).
    pub display_name: String,

    pub method: StatMethod,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<StatFormat>,
}

impl StatisticSpec {
    pub fn new(
        source_field: impl Into<String>,
        display_name: impl Into<String>,
        method: impl Into<StatMethod>,
    ) -> Self {
        StatisticSpec {
            source_field: source_field.into(),
            display_name: display_name.into(),
            method: method.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: StatFormat) -> Self {
        self.format = Some(format);
        self
    }
}

// ============================================================================
// OPTIONS & MAIN DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTabOptions {
    /// Keep members, the child lookup index and running aggregates on the
    /// returned tree instead of pruning them.
    #[serde(default)]
    pub retain_detail: bool,
}

/// The complete, serializable definition of a cross table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossTabDefinition {
    /// Row grouping attributes (outer to inner).
    #[serde(default)]
    pub row_keys: Vec<String>,

    /// Column grouping attributes (outer to inner). They continue the row
    /// hierarchy; they do not form an independent axis.
    #[serde(default)]
    pub column_keys: Vec<String>,

    #[serde(default)]
    pub statistics: Vec<StatisticSpec>,

    #[serde(default)]
    pub options: CrossTabOptions,
}

impl CrossTabDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row keys followed by column keys: the combined path of the tree.
    pub fn group_keys(&self) -> Vec<String> {
        self.row_keys
            .iter()
            .chain(self.column_keys.iter())
            .cloned()
            .collect()
    }

    pub fn statistic_names(&self) -> Vec<String> {
        self.statistics
            .iter()
            .map(|s| s.display_name.clone())
            .collect()
    }

    /// Running aggregates and stats are keyed by display name, so names
    /// must not repeat.
    pub fn validate(&self) -> Result<(), CrossTabError> {
        let mut seen = FxHashSet::default();
        for spec in &self.statistics {
            if !seen.insert(spec.display_name.as_str()) {
                return Err(CrossTabError::DuplicateStatistic(spec.display_name.clone()));
            }
        }
        Ok(())
    }
}
