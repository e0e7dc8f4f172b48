//! FILENAME: core/crosstab-engine/src/lib.rs
//! Cross table grouping-and-aggregation engine.
//!
//! Groups a flat list of records into a nested hierarchy keyed by a sequence
//! of attributes and computes statistics at every level of it. Laying the
//! tree out as a grid is left to the caller.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the cross table IS)
//! - `record`: Source values and records
//! - `builder` + `aggregate`: One-pass tree construction with running aggregates
//! - `evaluator`: Final statistics per node (built-in pass, then custom pass)
//! - `prune`: Strips construction-only state from the result
//! - `tree`: The resulting hierarchy

pub mod aggregate;
pub mod builder;
pub mod coerce;
pub mod definition;
pub mod error;
pub mod evaluator;
pub mod outline;
pub mod prune;
pub mod record;
pub mod stats;
pub mod tree;

pub use aggregate::RunningAggregate;
pub use builder::{build_tree, TreeBuilder};
pub use definition::*;
pub use error::{CrossTabError, FormatFailure};
pub use evaluator::{evaluate, unsupported_method_label, FORMAT_ERROR};
pub use outline::{log_outline, render_outline};
pub use prune::prune;
pub use record::{Record, Value};
pub use stats::{NamedMap, StatValue, Stats};
pub use tree::{CrossTable, GroupNode, GroupPath, PathSegment, MISSING_LABEL};

/// Builds, evaluates and (unless `retain_detail` is set) prunes the cross
/// table for `records`.
pub fn cross_table(
    records: &[Record],
    definition: &CrossTabDefinition,
) -> Result<CrossTable, CrossTabError> {
    definition.validate()?;

    let group_keys = definition.group_keys();
    let mut root = build_tree(records, &group_keys, &definition.statistics);
    evaluate(&mut root, records, &definition.statistics)?;

    if !definition.options.retain_detail {
        prune(&mut root);
    }

    let table = CrossTable {
        row_keys: definition.row_keys.clone(),
        column_keys: definition.column_keys.clone(),
        statistic_names: definition.statistic_names(),
        root,
    };
    log_outline(&table);
    Ok(table)
}
