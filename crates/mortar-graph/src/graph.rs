//! Core relation graph data structure.
//!
//! The RelationGraph wraps petgraph and adds a string-id index for
//! name-based lookups. Each directed edge carries the collapsed signed
//! relation for that ordered pair; the presence of `A -> B` does not
//! imply an entry for `B -> A` unless the reverse direction was
//! recorded too.

use crate::relation::Relation;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// A signed relation graph over named nodes (modules or headers).
///
/// Built once by the [`GraphBuilder`](crate::GraphBuilder) and treated
/// as read-only by every downstream consumer.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RelationGraph {
    /// The underlying petgraph graph; node weights are the names.
    pub(crate) graph: DiGraph<String, Relation>,

    /// Maps names to graph node indexes.
    id_index: HashMap<String, NodeId>,
}

impl RelationGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
        }
    }

    /// Returns the node index for a name, inserting the node on demand.
    pub(crate) fn ensure_node(&mut self, name: &str) -> NodeId {
        if let Some(&index) = self.id_index.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.id_index.insert(name.to_string(), index);
        index
    }

    /// Records the relation for an ordered pair.
    ///
    /// Replaces any previous entry for the same pair; the builder
    /// collapses observations first, so each pair is written once.
    pub fn add_relation(&mut self, source: &str, target: &str, relation: Relation) {
        let from = self.ensure_node(source);
        let to = self.ensure_node(target);
        self.graph.update_edge(from, to, relation);
    }

    /// Gets the relation for an ordered pair.
    ///
    /// `None` means the pair was never observed, which is distinct
    /// from every signed relation value.
    pub fn relation(&self, source: &str, target: &str) -> Option<Relation> {
        let from = *self.id_index.get(source)?;
        let to = *self.id_index.get(target)?;
        let edge = self.graph.find_edge(from, to)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Returns all outgoing relations of a node.
    ///
    /// Empty for unknown nodes and for nodes with no outgoing entries.
    pub fn relations_of(&self, name: &str) -> Vec<(&str, Relation)> {
        let Some(&index) = self.id_index.get(name) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(index, Direction::Outgoing)
            .filter_map(|edge| {
                let target = self.graph.node_weight(edge.target())?;
                Some((target.as_str(), *edge.weight()))
            })
            .collect()
    }

    /// Returns the outgoing neighbors related with exactly `relation`.
    pub fn neighbors_with(&self, name: &str, relation: Relation) -> Vec<&str> {
        self.relations_of(name)
            .into_iter()
            .filter(|(_, rel)| *rel == relation)
            .map(|(target, _)| target)
            .collect()
    }

    /// Number of outgoing relation entries for a node.
    pub fn degree(&self, name: &str) -> usize {
        match self.id_index.get(name) {
            Some(&index) => self.graph.edges_directed(index, Direction::Outgoing).count(),
            None => 0,
        }
    }

    /// True when the node appears in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.id_index.contains_key(name)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of relation entries.
    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all node names.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Gets the node index for a name.
    pub(crate) fn index_of(&self, name: &str) -> Option<NodeId> {
        self.id_index.get(name).copied()
    }
}

/// Graph statistics for overview output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub relations: usize,
    pub primary: usize,
    pub reverse: usize,
    pub conflict: usize,
}

impl RelationGraph {
    /// Returns node, relation and per-sign counts.
    pub fn stats(&self) -> GraphStats {
        let mut primary = 0;
        let mut reverse = 0;
        let mut conflict = 0;
        for relation in self.graph.edge_weights() {
            match relation {
                Relation::Primary => primary += 1,
                Relation::Reverse => reverse += 1,
                Relation::Conflict => conflict += 1,
            }
        }
        GraphStats {
            nodes: self.node_count(),
            relations: self.relation_count(),
            primary,
            reverse,
            conflict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_pair_is_none() {
        let graph = RelationGraph::new();
        assert_eq!(graph.relation("a", "b"), None);
        assert!(graph.relations_of("a").is_empty());
        assert_eq!(graph.degree("a"), 0);
    }

    #[test]
    fn test_add_and_query() {
        let mut graph = RelationGraph::new();
        graph.add_relation("a", "b", Relation::Primary);
        graph.add_relation("b", "a", Relation::Reverse);
        graph.add_relation("a", "c", Relation::Conflict);

        assert_eq!(graph.relation("a", "b"), Some(Relation::Primary));
        assert_eq!(graph.relation("b", "a"), Some(Relation::Reverse));
        assert_eq!(graph.relation("a", "c"), Some(Relation::Conflict));
        // No reverse entry was recorded for (c, a).
        assert_eq!(graph.relation("c", "a"), None);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.relation_count(), 3);
        assert_eq!(graph.degree("a"), 2);
    }

    #[test]
    fn test_update_replaces_entry() {
        let mut graph = RelationGraph::new();
        graph.add_relation("a", "b", Relation::Primary);
        graph.add_relation("a", "b", Relation::Conflict);

        assert_eq!(graph.relation("a", "b"), Some(Relation::Conflict));
        assert_eq!(graph.relation_count(), 1);
    }

    #[test]
    fn test_neighbors_with_filters_by_sign() {
        let mut graph = RelationGraph::new();
        graph.add_relation("a", "b", Relation::Primary);
        graph.add_relation("a", "c", Relation::Primary);
        graph.add_relation("a", "d", Relation::Reverse);

        let mut primary = graph.neighbors_with("a", Relation::Primary);
        primary.sort_unstable();
        assert_eq!(primary, vec!["b", "c"]);
        assert_eq!(graph.neighbors_with("a", Relation::Reverse), vec!["d"]);
        assert!(graph.neighbors_with("a", Relation::Conflict).is_empty());
    }

    #[test]
    fn test_stats_breakdown() {
        let mut graph = RelationGraph::new();
        graph.add_relation("a", "b", Relation::Primary);
        graph.add_relation("b", "a", Relation::Reverse);
        graph.add_relation("a", "c", Relation::Conflict);
        graph.add_relation("c", "a", Relation::Conflict);

        let stats = graph.stats();
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.relations, 4);
        assert_eq!(stats.primary, 1);
        assert_eq!(stats.reverse, 1);
        assert_eq!(stats.conflict, 2);
    }
}
