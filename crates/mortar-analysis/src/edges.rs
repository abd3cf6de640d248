//! Edge-reduction estimation for candidate merge groups.
//!
//! Merging a group deduplicates outgoing edges: member-to-member edges
//! disappear entirely, and edges to a common external target collapse
//! into one. The reduction is the primary ranking signal for merge
//! recommendations.

use mortar_graph::RelationGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Edge counts before and after a hypothetical merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMetrics {
    /// Sum of every member's outgoing edge count.
    pub original_edges: usize,

    /// Edges between two group members, counted once per pair. The
    /// raw adjacency walk sees each internal pair from both ends, so
    /// the count is halved.
    pub internal_edges: usize,

    /// Distinct external targets across all members.
    pub merged_edges: usize,

    /// `original_edges - merged_edges`.
    pub edge_reduction: usize,
}

/// Estimates the edge metrics for merging `group`.
pub fn estimate_edges(group: &[String], graph: &RelationGraph) -> EdgeMetrics {
    let members: HashSet<&str> = group.iter().map(String::as_str).collect();

    let mut original_edges = 0;
    let mut internal_seen = 0;
    let mut external_targets: HashSet<&str> = HashSet::new();

    for member in group {
        for (target, _) in graph.relations_of(member) {
            original_edges += 1;
            if members.contains(target) {
                internal_seen += 1;
            } else {
                external_targets.insert(target);
            }
        }
    }

    let merged_edges = external_targets.len();
    EdgeMetrics {
        original_edges,
        internal_edges: internal_seen / 2,
        merged_edges,
        edge_reduction: original_edges - merged_edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortar_graph::Relation;

    fn group(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shared_target_scenario() {
        // A -> {X, Y}, B -> {X, Z}: four original edges collapse to
        // three distinct targets.
        let mut graph = RelationGraph::new();
        for (from, to) in [("a", "x"), ("a", "y"), ("b", "x"), ("b", "z")] {
            graph.add_relation(from, to, Relation::Primary);
        }

        let metrics = estimate_edges(&group(&["a", "b"]), &graph);
        assert_eq!(metrics.original_edges, 4);
        assert_eq!(metrics.internal_edges, 0);
        assert_eq!(metrics.merged_edges, 3);
        assert_eq!(metrics.edge_reduction, 1);
    }

    #[test]
    fn test_internal_edges_halved() {
        // a and b relate to each other (both directions recorded) and
        // each has one external target.
        let mut graph = RelationGraph::new();
        graph.add_relation("a", "b", Relation::Primary);
        graph.add_relation("b", "a", Relation::Reverse);
        graph.add_relation("a", "x", Relation::Primary);
        graph.add_relation("b", "y", Relation::Primary);

        let metrics = estimate_edges(&group(&["a", "b"]), &graph);
        assert_eq!(metrics.original_edges, 4);
        assert_eq!(metrics.internal_edges, 1);
        assert_eq!(metrics.merged_edges, 2);
        assert_eq!(metrics.edge_reduction, 2);
    }

    #[test]
    fn test_empty_group() {
        let graph = RelationGraph::new();
        let metrics = estimate_edges(&[], &graph);
        assert_eq!(metrics, EdgeMetrics::default());
    }

    #[test]
    fn test_unknown_member_contributes_nothing() {
        let mut graph = RelationGraph::new();
        graph.add_relation("a", "x", Relation::Primary);

        let metrics = estimate_edges(&group(&["a", "ghost"]), &graph);
        assert_eq!(metrics.original_edges, 1);
        assert_eq!(metrics.merged_edges, 1);
        assert_eq!(metrics.edge_reduction, 0);
    }
}
