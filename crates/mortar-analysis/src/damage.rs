//! Damage scoring for candidate merge groups.
//!
//! Damage penalizes groups whose relations barely overlap: merging
//! two nodes that depend on disjoint sets drags every unshared
//! dependency into the merged unit. The formula
//! `unshared / (shared + 1)` is a deliberate heuristic, not a
//! probabilistic model; ranking comparisons depend on its exact shape,
//! so it must not be "improved".

use mortar_graph::{Relation, RelationCounts, RelationGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Overlap and damage metrics for one candidate group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageMetrics {
    /// Targets related to by >= 2 group members, per sign.
    pub shared_primary: usize,
    pub shared_reverse: usize,

    /// Distinct targets across all members, per sign.
    pub unique_primary: usize,
    pub unique_reverse: usize,

    /// Distinct targets hit by exactly one member.
    pub unshared_primary: usize,
    pub unshared_reverse: usize,

    /// Duplicate relations removed by merging: sum of members'
    /// direct counts minus the distinct target count.
    pub redundant_primary: usize,
    pub redundant_reverse: usize,

    /// `unshared / (shared + 1)`, per sign; their sum.
    pub primary_damage: f64,
    pub reverse_damage: f64,
    pub total_damage: f64,
}

/// Scores the coupling damage of merging `group`.
///
/// An empty group returns all-zero metrics.
pub fn score_group(
    group: &[String],
    graph: &RelationGraph,
    counts: &RelationCounts,
) -> DamageMetrics {
    if group.is_empty() {
        return DamageMetrics::default();
    }

    // How many members relate to each target, per sign.
    let mut primary_targets: HashMap<&str, usize> = HashMap::new();
    let mut reverse_targets: HashMap<&str, usize> = HashMap::new();

    let mut total_primary = 0;
    let mut total_reverse = 0;

    for member in group {
        if let Some(count) = counts.get(member) {
            total_primary += count.direct_primary;
            total_reverse += count.direct_reverse;
        }

        for (target, relation) in graph.relations_of(member) {
            match relation {
                Relation::Primary => *primary_targets.entry(target).or_insert(0) += 1,
                Relation::Reverse => *reverse_targets.entry(target).or_insert(0) += 1,
                Relation::Conflict => {}
            }
        }
    }

    let shared_primary = primary_targets.values().filter(|&&n| n >= 2).count();
    let shared_reverse = reverse_targets.values().filter(|&&n| n >= 2).count();

    let unique_primary = primary_targets.len();
    let unique_reverse = reverse_targets.len();

    let unshared_primary = unique_primary - shared_primary;
    let unshared_reverse = unique_reverse - shared_reverse;

    let redundant_primary = total_primary - unique_primary;
    let redundant_reverse = total_reverse - unique_reverse;

    let primary_damage = unshared_primary as f64 / (shared_primary + 1) as f64;
    let reverse_damage = unshared_reverse as f64 / (shared_reverse + 1) as f64;

    DamageMetrics {
        shared_primary,
        shared_reverse,
        unique_primary,
        unique_reverse,
        unshared_primary,
        unshared_reverse,
        redundant_primary,
        redundant_reverse,
        primary_damage,
        reverse_damage,
        total_damage: primary_damage + reverse_damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// A depends on X, Y; B depends on X, Z (mirrored entries
    /// included, as the builder would produce them).
    fn overlap_graph() -> RelationGraph {
        let mut graph = RelationGraph::new();
        for (from, to) in [("a", "x"), ("a", "y"), ("b", "x"), ("b", "z")] {
            graph.add_relation(from, to, Relation::Primary);
            graph.add_relation(to, from, Relation::Reverse);
        }
        graph
    }

    #[test]
    fn test_partial_overlap_scenario() {
        let graph = overlap_graph();
        let counts = RelationCounts::compute(&graph);
        let metrics = score_group(&group(&["a", "b"]), &graph, &counts);

        // X is shared; X, Y, Z are the distinct targets; Y and Z are
        // carried by only one member each.
        assert_eq!(metrics.shared_primary, 1);
        assert_eq!(metrics.unique_primary, 3);
        assert_eq!(metrics.unshared_primary, 2);
        assert_eq!(metrics.redundant_primary, 1);

        assert!((metrics.primary_damage - 1.0).abs() < 1e-9);
        assert_eq!(metrics.reverse_damage, 0.0);
        assert!((metrics.total_damage - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_targets_score_worse_than_shared() {
        let mut graph = RelationGraph::new();
        // c and d depend on completely different targets.
        for (from, to) in [("c", "p"), ("c", "q"), ("d", "r"), ("d", "s")] {
            graph.add_relation(from, to, Relation::Primary);
            graph.add_relation(to, from, Relation::Reverse);
        }
        let counts = RelationCounts::compute(&graph);
        let disjoint = score_group(&group(&["c", "d"]), &graph, &counts);

        let graph = overlap_graph();
        let counts = RelationCounts::compute(&graph);
        let overlapping = score_group(&group(&["a", "b"]), &graph, &counts);

        assert!(disjoint.total_damage > overlapping.total_damage);
    }

    #[test]
    fn test_reverse_side_is_scored_symmetrically() {
        let mut graph = RelationGraph::new();
        // Both m and n are depended on by u.
        for (hub, dep) in [("m", "u"), ("n", "u")] {
            graph.add_relation(hub, dep, Relation::Reverse);
            graph.add_relation(dep, hub, Relation::Primary);
        }
        let counts = RelationCounts::compute(&graph);
        let metrics = score_group(&group(&["m", "n"]), &graph, &counts);

        assert_eq!(metrics.shared_reverse, 1);
        assert_eq!(metrics.unique_reverse, 1);
        assert_eq!(metrics.unshared_reverse, 0);
        assert_eq!(metrics.redundant_reverse, 1);
        assert_eq!(metrics.reverse_damage, 0.0);
    }

    #[test]
    fn test_empty_group_is_all_zero() {
        let graph = RelationGraph::new();
        let counts = RelationCounts::compute(&graph);
        let metrics = score_group(&[], &graph, &counts);
        assert_eq!(metrics, DamageMetrics::default());
    }

    #[test]
    fn test_conflict_relations_are_ignored() {
        let mut graph = RelationGraph::new();
        graph.add_relation("a", "x", Relation::Conflict);
        graph.add_relation("x", "a", Relation::Conflict);
        let counts = RelationCounts::compute(&graph);
        let metrics = score_group(&group(&["a"]), &graph, &counts);

        assert_eq!(metrics.unique_primary, 0);
        assert_eq!(metrics.unique_reverse, 0);
        assert_eq!(metrics.total_damage, 0.0);
    }
}
