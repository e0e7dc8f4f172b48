//! FILENAME: core/crosstab-engine/src/prune.rs
//! Tree Pruner - drops construction-only state before the tree is handed out.

use crate::tree::GroupNode;

/// Recursively removes members, the child lookup index and running
/// aggregates. `key`, `value`, `path`, `stats` and the ordered `children`
/// are kept.
pub fn prune(node: &mut GroupNode) {
    node.members = None;
    node.child_index = None;
    node.running = None;
    for child in node.children.iter_mut() {
        prune(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_tree;
    use crate::definition::{BuiltinMethod, StatisticSpec};
    use crate::record::Record;

    #[test]
    fn test_prune_strips_every_level() {
        let records = vec![
            Record::new().with("a", "x").with("b", 1).with("n", 2),
            Record::new().with("a", "y").with("b", 2).with("n", 3),
        ];
        let keys = vec!["a".to_string(), "b".to_string()];
        let specs = vec![StatisticSpec::new("n", "total", BuiltinMethod::Sum)];
        let mut root = build_tree(&records, &keys, &specs);
        assert!(root.descendants().all(GroupNode::has_detail));

        prune(&mut root);

        assert!(root.descendants().all(|n| !n.has_detail()));
        assert!(root.descendants().all(|n| n.members().is_none()));
        assert_eq!(root.node_count(), 5);
        assert_eq!(root.child_labels(), vec!["x", "y"]);
        assert!(root.child_by("y").and_then(|y| y.child_by(2)).is_some());
    }

    #[test]
    fn test_pruned_tree_serializes_without_transient_fields() {
        let records = vec![Record::new().with("a", "x").with("n", 2)];
        let keys = vec!["a".to_string()];
        let specs = vec![StatisticSpec::new("n", "total", BuiltinMethod::Sum)];
        let mut root = build_tree(&records, &keys, &specs);

        let detailed = serde_json::to_value(&root).unwrap();
        assert!(detailed.get("members").is_some());
        assert!(detailed.get("running").is_some());

        prune(&mut root);
        let pruned = serde_json::to_value(&root).unwrap();
        assert!(pruned.get("members").is_none());
        assert!(pruned.get("running").is_none());
        assert!(pruned.get("children").is_some());
    }
}
