//! FILENAME: core/crosstab-engine/src/tree.rs
//! Group Tree - The nested hierarchy produced by the builder.
//!
//! Ownership is strictly tree-shaped: every node is owned by its parent's
//! `children` vector. There is no parent back-pointer; a node's `path` holds
//! the full ancestor chain, and ancestors are reached from the root with
//! [`GroupNode::find`].

use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::aggregate::RunningAggregate;
use crate::record::Value;
use crate::stats::{NamedMap, StatValue, Stats};

/// Lookup key of a child among its siblings: the canonical string form of
/// the attribute value, or `None` when the record lacked the attribute.
pub type ChildKey = Option<String>;

/// Label shown for a node whose records lacked the grouping attribute.
pub const MISSING_LABEL: &str = "(missing)";

pub(crate) fn child_key(value: Option<&Value>) -> ChildKey {
    value.map(Value::canonical_key)
}

// ============================================================================
// PATH
// ============================================================================

/// One `{key, value}` step from the root towards a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    pub key: String,
    /// `None` when the record lacked the attribute.
    pub value: Option<Value>,
}

impl PathSegment {
    pub fn new(key: impl Into<String>, value: Option<Value>) -> Self {
        PathSegment {
            key: key.into(),
            value,
        }
    }
}

/// Grouping depth is small in practice; most paths never spill to the heap.
pub type GroupPath = SmallVec<[PathSegment; 4]>;

// ============================================================================
// GROUP NODE
// ============================================================================

/// One node of the grouping hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct GroupNode {
    /// Grouping attribute this node was split on (empty for the root).
    pub key: String,

    /// Attribute value selecting this node among its siblings (`None` for
    /// the root, and for the bucket of records lacking the attribute).
    pub value: Option<Value>,

    /// Root-to-node chain of `{key, value}` pairs (empty for the root).
    pub path: GroupPath,

    /// Final statistics in definition order. Empty until evaluated.
    pub stats: Stats,

    /// Child nodes in first-seen order.
    pub children: Vec<GroupNode>,

    /// Indices of the records routed through this node (transient).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) members: Option<Vec<usize>>,

    /// Running aggregate per statistic, keyed by display name (transient).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) running: Option<NamedMap<RunningAggregate>>,

    /// Child lookup by canonical value (transient).
    #[serde(skip)]
    pub(crate) child_index: Option<FxHashMap<ChildKey, usize>>,
}

impl GroupNode {
    pub(crate) fn root(running: NamedMap<RunningAggregate>) -> Self {
        GroupNode {
            key: String::new(),
            value: None,
            path: GroupPath::new(),
            stats: Stats::new(),
            children: Vec::new(),
            members: Some(Vec::new()),
            running: Some(running),
            child_index: Some(FxHashMap::default()),
        }
    }

    /// Creates a child with `path` = this path + `{key, value}`.
    pub(crate) fn new_child(
        &self,
        key: &str,
        value: Option<Value>,
        running: NamedMap<RunningAggregate>,
    ) -> Self {
        let mut path = self.path.clone();
        path.push(PathSegment::new(key, value.clone()));
        GroupNode {
            key: key.to_string(),
            value,
            path,
            stats: Stats::new(),
            children: Vec::new(),
            members: Some(Vec::new()),
            running: Some(running),
            child_index: Some(FxHashMap::default()),
        }
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of grouping levels above this node (0 for the root).
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Display form of the value.
    pub fn label(&self) -> String {
        match &self.value {
            Some(value) => value.canonical_key(),
            None if self.is_root() => String::new(),
            None => MISSING_LABEL.to_string(),
        }
    }

    /// Path of the enclosing node; `None` for the root.
    pub fn parent_path(&self) -> Option<&[PathSegment]> {
        match self.path.len() {
            0 => None,
            n => Some(&self.path[..n - 1]),
        }
    }

    /// Indices (into the built record slice) of the records routed through
    /// this node, or `None` once pruned.
    pub fn members(&self) -> Option<&[usize]> {
        self.members.as_deref()
    }

    pub fn running_aggregate(&self, display_name: &str) -> Option<&RunningAggregate> {
        self.running.as_ref()?.get(display_name)
    }

    pub fn running_aggregates(&self) -> Option<&NamedMap<RunningAggregate>> {
        self.running.as_ref()
    }

    pub fn has_detail(&self) -> bool {
        self.members.is_some() || self.running.is_some() || self.child_index.is_some()
    }

    pub fn stat(&self, display_name: &str) -> Option<&StatValue> {
        self.stats.get(display_name)
    }

    /// Looks up the direct child selected by `value` (`None` = the missing
    /// attribute bucket). Works on pruned trees too, by scanning.
    pub fn child(&self, value: Option<&Value>) -> Option<&GroupNode> {
        let key = child_key(value);
        match &self.child_index {
            Some(index) => index.get(&key).map(|&i| &self.children[i]),
            None => self
                .children
                .iter()
                .find(|c| child_key(c.value.as_ref()) == key),
        }
    }

    /// Shorthand for looking up a child by a present value.
    pub fn child_by(&self, value: impl Into<Value>) -> Option<&GroupNode> {
        self.child(Some(&value.into()))
    }

    /// Follows `path` (relative to this node) down the tree.
    pub fn find(&self, path: &[PathSegment]) -> Option<&GroupNode> {
        let mut node = self;
        for segment in path {
            let next = node.child(segment.value.as_ref())?;
            if next.key != segment.key {
                return None;
            }
            node = next;
        }
        Some(node)
    }

    /// Pre-order traversal including this node.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.descendants().count()
    }

    pub fn child_labels(&self) -> Vec<String> {
        self.children.iter().map(GroupNode::label).collect()
    }
}

/// Iterator returned by [`GroupNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a GroupNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a GroupNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// ============================================================================
// CROSS TABLE
// ============================================================================

/// The final result: the evaluated tree plus the key and statistic lists a
/// presentation layer needs to lay it out.
#[derive(Debug, Clone, Serialize)]
pub struct CrossTable {
    pub row_keys: Vec<String>,
    pub column_keys: Vec<String>,
    /// Display names in definition order; matches every node's `stats` keys.
    pub statistic_names: Vec<String>,
    pub root: GroupNode,
}

impl CrossTable {
    pub fn group_keys(&self) -> Vec<String> {
        self.row_keys
            .iter()
            .chain(self.column_keys.iter())
            .cloned()
            .collect()
    }

    /// Whether nodes at `depth` were split on a column attribute.
    pub fn is_column_level(&self, depth: usize) -> bool {
        depth > self.row_keys.len() && depth <= self.row_keys.len() + self.column_keys.len()
    }

    pub fn node_at(&self, path: &[PathSegment]) -> Option<&GroupNode> {
        self.root.find(path)
    }

    /// The enclosing node of `node`, resolved through its path.
    pub fn parent_of(&self, node: &GroupNode) -> Option<&GroupNode> {
        self.root.find(node.parent_path()?)
    }
}
