//! FILENAME: core/crosstab-engine/src/outline.rs
//! Text dump of an evaluated tree, for debugging.

use std::fmt::Write;

use crate::tree::{CrossTable, GroupNode};

const INDENT: &str = "------";

/// One line per node: `------` per depth level, the node label, then the
/// node's stats as a JSON object.
pub fn render_outline(node: &GroupNode) -> String {
    let mut out = String::new();
    for n in node.descendants() {
        let depth = n.depth() - node.depth();
        let stats = serde_json::to_string(&n.stats).unwrap_or_else(|_| "{}".to_string());
        let _ = writeln!(out, "{}{}    {}", INDENT.repeat(depth), n.label(), stats);
    }
    out
}

/// Emits the outline at trace level.
pub fn log_outline(table: &CrossTable) {
    if log::log_enabled!(target: "crosstab", log::Level::Trace) {
        for line in render_outline(&table.root).lines() {
            log::trace!(target: "crosstab", "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross_table;
    use crate::definition::{BuiltinMethod, CrossTabDefinition, StatisticSpec};
    use crate::record::Record;

    #[test]
    fn test_outline_lines() {
        let records = vec![
            Record::new().with("region", "A").with("amount", 10),
            Record::new().with("region", "B").with("amount", 5),
            Record::new().with("amount", 1),
        ];
        let mut def = CrossTabDefinition::new();
        def.row_keys.push("region".to_string());
        def.statistics.push(StatisticSpec::new("amount", "total", BuiltinMethod::Sum));
        let table = cross_table(&records, &def).unwrap();

        let outline = render_outline(&table.root);
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"    {"total":16.0}"#,
                r#"------A    {"total":10.0}"#,
                r#"------B    {"total":5.0}"#,
                r#"------(missing)    {"total":1.0}"#,
            ]
        );
    }

    #[test]
    fn test_outline_of_subtree_starts_at_zero_indent() {
        let records = vec![Record::new().with("a", "x").with("b", "y")];
        let mut def = CrossTabDefinition::new();
        def.row_keys = vec!["a".to_string(), "b".to_string()];
        let table = cross_table(&records, &def).unwrap();

        let sub = table.root.child_by("x").unwrap();
        assert_eq!(render_outline(sub), "x    {}\n------y    {}\n");
    }
}
