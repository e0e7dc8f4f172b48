//! FILENAME: core/crosstab-engine/src/aggregate.rs
//! Incremental Aggregator - running per-statistic state on every node.
//!
//! Every record updates the root and each node along its grouping path
//! exactly once, so after the build every ancestor already holds its totals
//! and no second pass over the raw records is needed.

use serde::Serialize;

use crate::coerce::to_number_or;
use crate::definition::{BuiltinMethod, StatisticSpec};
use crate::record::{Record, Value};
use crate::stats::NamedMap;
use crate::tree::GroupNode;

// ============================================================================
// RUNNING AGGREGATE
// ============================================================================

/// Accumulated state for one statistic on one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningAggregate {
    /// Sum of coerced values (absent or unparsable values add nothing).
    pub sum: f64,
    /// Every record routed through the node.
    pub count_all: u64,
    /// Records whose raw value is present and truthy. A present `0` is not
    /// counted.
    pub count_non_empty: u64,
}

impl RunningAggregate {
    pub fn new() -> Self {
        RunningAggregate::default()
    }

    /// Folds in one record's raw value (`None` = attribute absent).
    pub fn add(&mut self, raw: Option<&Value>) {
        if let Some(value) = raw {
            self.sum += to_number_or(value, 0.0);
            if value.is_truthy() {
                self.count_non_empty += 1;
            }
        }
        self.count_all += 1;
    }

    /// Computes a built-in statistic. Zero denominators follow IEEE
    /// division (`0/0` is `NaN`).
    pub fn compute(&self, method: BuiltinMethod) -> f64 {
        match method {
            BuiltinMethod::Sum => self.sum,
            BuiltinMethod::Count => self.count_all as f64,
            BuiltinMethod::Avg => self.sum / self.count_all as f64,
            BuiltinMethod::Count2 => self.count_non_empty as f64,
            BuiltinMethod::Avg2 => self.sum / self.count_non_empty as f64,
        }
    }
}

/// Fresh zeroed aggregates, one per statistic, in definition order.
pub(crate) fn empty_aggregates(specs: &[StatisticSpec]) -> NamedMap<RunningAggregate> {
    let mut map = NamedMap::with_capacity(specs.len());
    for spec in specs {
        map.insert(spec.display_name.as_str(), RunningAggregate::new());
    }
    map
}

/// Applies one record to every running aggregate of `node`.
///
/// Aggregates missing from the node are created zeroed on first use.
pub fn update(node: &mut GroupNode, record: &Record, specs: &[StatisticSpec]) {
    let running = node.running.get_or_insert_with(NamedMap::new);
    for (i, spec) in specs.iter().enumerate() {
        let raw = record.get(&spec.source_field);
        // Nodes made by the builder hold their aggregates in spec order.
        let slot = if running.name_at(i) == Some(spec.display_name.as_str()) {
            running.value_at_mut(i)
        } else {
            running.get_mut(&spec.display_name)
        };
        match slot {
            Some(agg) => agg.add(raw),
            None => {
                let mut agg = RunningAggregate::new();
                agg.add(raw);
                running.insert(spec.display_name.as_str(), agg);
            }
        }
    }
}
