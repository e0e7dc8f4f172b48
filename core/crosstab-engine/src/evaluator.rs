//! FILENAME: core/crosstab-engine/src/evaluator.rs
//! Statistic Evaluator - turns running aggregates into final `stats`.
//!
//! Each node is evaluated in two passes over the statistic specs:
//! 1. Built-in methods (and unsupported tags), read from the running aggregate
//! 2. Custom methods, which receive the node's stats from pass 1 and its
//!    member records
//!
//! Pass 2 only runs custom specs, and pass 1 only runs the rest. Each spec is
//! computed exactly once per node. After both passes the stats are put back
//! into definition order.

use crate::aggregate::RunningAggregate;
use crate::coerce::text_to_number_or;
use crate::definition::{StatFormat, StatMethod, StatisticSpec};
use crate::error::CrossTabError;
use crate::record::Record;
use crate::stats::{StatValue, Stats};
use crate::tree::GroupNode;

/// Result text of a statistic whose format failed.
pub const FORMAT_ERROR: &str = "format error";

/// Result text of a statistic whose method tag is not a built-in.
pub fn unsupported_method_label(tag: &str) -> String {
    format!("not support {}", tag)
}

/// Computes `stats` for `root` and every descendant. `records` must be the
/// slice the tree was built from, since members are stored as indices.
pub fn evaluate(
    root: &mut GroupNode,
    records: &[Record],
    statistics: &[StatisticSpec],
) -> Result<(), CrossTabError> {
    let mut evaluated = 0usize;
    evaluate_node(root, records, statistics, &mut evaluated)?;
    log::debug!(
        target: "crosstab",
        "evaluated {} statistics on {} nodes",
        statistics.len(),
        evaluated
    );
    Ok(())
}

fn evaluate_node(
    node: &mut GroupNode,
    records: &[Record],
    statistics: &[StatisticSpec],
    evaluated: &mut usize,
) -> Result<(), CrossTabError> {
    node.stats = compute_stats(node, records, statistics)?;
    *evaluated += 1;

    for child in node.children.iter_mut() {
        evaluate_node(child, records, statistics, evaluated)?;
    }
    Ok(())
}

fn compute_stats(
    node: &GroupNode,
    records: &[Record],
    statistics: &[StatisticSpec],
) -> Result<Stats, CrossTabError> {
    let mut stats = Stats::with_capacity(statistics.len());
    let missing_detail = || CrossTabError::MissingDetail(describe(node));

    // Pass 1: built-in methods.
    for spec in statistics.iter().filter(|s| !s.method.is_custom()) {
        let value = match &spec.method {
            StatMethod::Builtin(method) => {
                let agg = match &node.running {
                    Some(running) => running
                        .get(&spec.display_name)
                        .copied()
                        .unwrap_or_else(RunningAggregate::new),
                    None => return Err(missing_detail()),
                };
                StatValue::Number(agg.compute(*method))
            }
            StatMethod::Unsupported(tag) => StatValue::Text(unsupported_method_label(tag)),
            StatMethod::Custom(_) => continue,
        };
        stats.insert(spec.display_name.as_str(), apply_format(value, spec.format.as_ref()));
    }

    // Pass 2: custom methods, seeing the pass-1 results of this node.
    if statistics.iter().any(|s| s.method.is_custom()) {
        let indices = node.members.as_deref().ok_or_else(missing_detail)?;
        let members = indices
            .iter()
            .map(|&index| {
                records.get(index).ok_or(CrossTabError::MemberOutOfRange {
                    index,
                    len: records.len(),
                })
            })
            .collect::<Result<Vec<&Record>, _>>()?;

        for spec in statistics {
            if let StatMethod::Custom(custom) = &spec.method {
                let value = custom.call(&stats, &members);
                stats.insert(spec.display_name.as_str(), apply_format(value, spec.format.as_ref()));
            }
        }
    }

    Ok(in_definition_order(stats, statistics))
}

/// Formats a computed value. Any failure becomes [`FORMAT_ERROR`].
pub fn apply_format(value: StatValue, format: Option<&StatFormat>) -> StatValue {
    let formatted = match format {
        None => return value,
        Some(StatFormat::Decimals(digits)) => value.fixed(*digits),
        Some(StatFormat::DecimalsText(digits)) => value.fixed(text_to_number_or(digits, 0.0)),
        Some(StatFormat::Custom(f)) => f.call(&value).ok(),
    };
    formatted.unwrap_or_else(|| StatValue::Text(FORMAT_ERROR.to_string()))
}

fn in_definition_order(mut computed: Stats, statistics: &[StatisticSpec]) -> Stats {
    let mut ordered = Stats::with_capacity(statistics.len());
    for spec in statistics {
        if let Some(value) = computed.remove(&spec.display_name) {
            ordered.insert(spec.display_name.as_str(), value);
        }
    }
    ordered
}

fn describe(node: &GroupNode) -> String {
    if node.is_root() {
        return "<root>".to_string();
    }
    node.path
        .iter()
        .map(|seg| match &seg.value {
            Some(v) => format!("{}={}", seg.key, v.canonical_key()),
            None => format!("{}=<missing>", seg.key),
        })
        .collect::<Vec<_>>()
        .join("/")
}
