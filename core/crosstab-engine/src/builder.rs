//! FILENAME: core/crosstab-engine/src/builder.rs
//! GroupTree Builder - one pass over the records builds the whole hierarchy.
//!
//! Algorithm (per record, in input order):
//! 1. Route the record into the root and update the root's running aggregates
//! 2. For each grouping key, find the child for the record's value, creating
//!    it on first sight
//! 3. Descend, route the record into that child and update its aggregates
//!
//! Siblings keep first-seen order. Nothing is sorted here.

use rustc_hash::FxHashMap;

use crate::aggregate::{self, empty_aggregates};
use crate::definition::StatisticSpec;
use crate::record::{Record, Value};
use crate::tree::{child_key, GroupNode};

/// Incrementally builds a group tree from streamed records.
pub struct TreeBuilder<'a> {
    group_keys: &'a [String],
    statistics: &'a [StatisticSpec],
    root: GroupNode,
    record_count: usize,
    node_count: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(group_keys: &'a [String], statistics: &'a [StatisticSpec]) -> Self {
        TreeBuilder {
            group_keys,
            statistics,
            root: GroupNode::root(empty_aggregates(statistics)),
            record_count: 0,
            node_count: 1,
        }
    }

    /// Routes one record through the tree. `index` is what the nodes store
    /// as the member reference, normally the record's position in the input.
    pub fn push(&mut self, index: usize, record: &Record) {
        let statistics = self.statistics;
        let mut created = 0;

        let mut node = &mut self.root;
        route(node, index, record, statistics);

        for key in self.group_keys {
            let (child, is_new) = descend(node, key, record.get(key), statistics);
            if is_new {
                created += 1;
            }
            node = child;
            route(node, index, record, statistics);
        }

        self.node_count += created;
        self.record_count += 1;
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn finish(self) -> GroupNode {
        log::debug!(
            target: "crosstab",
            "built group tree: {} records, {} keys, {} nodes",
            self.record_count,
            self.group_keys.len(),
            self.node_count
        );
        self.root
    }
}

fn route(node: &mut GroupNode, index: usize, record: &Record, statistics: &[StatisticSpec]) {
    node.members.get_or_insert_with(Vec::new).push(index);
    aggregate::update(node, record, statistics);
}

/// Returns the child of `node` selected by `value`, creating it if needed.
fn descend<'n>(
    node: &'n mut GroupNode,
    key: &str,
    value: Option<&Value>,
    statistics: &[StatisticSpec],
) -> (&'n mut GroupNode, bool) {
    let lookup = child_key(value);
    let existing = node
        .child_index
        .as_ref()
        .and_then(|index| index.get(&lookup).copied());

    match existing {
        Some(idx) => (&mut node.children[idx], false),
        None => {
            let child = node.new_child(key, value.cloned(), empty_aggregates(statistics));
            let idx = node.children.len();
            node.children.push(child);
            node.child_index
                .get_or_insert_with(FxHashMap::default)
                .insert(lookup, idx);
            (&mut node.children[idx], true)
        }
    }
}

/// Builds the tree for `records` grouped by `group_keys`, with running
/// aggregates for `statistics`. With no keys the tree is the root alone.
pub fn build_tree(
    records: &[Record],
    group_keys: &[String],
    statistics: &[StatisticSpec],
) -> GroupNode {
    let mut builder = TreeBuilder::new(group_keys, statistics);
    for (index, record) in records.iter().enumerate() {
        builder.push(index, record);
    }
    builder.finish()
}
