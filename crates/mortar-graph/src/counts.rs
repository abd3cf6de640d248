//! Per-node relation counts, direct and transitive.

use crate::graph::RelationGraph;
use crate::relation::Relation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Direct and transitive relation counts for one node.
///
/// "Direct" counts one-hop entries of a sign; "total" is the size of
/// the transitive closure reachable through edges of that sign, so
/// `total_* >= direct_*` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationCount {
    pub direct_primary: usize,
    pub total_primary: usize,
    pub direct_reverse: usize,
    pub total_reverse: usize,
}

/// The relation count table for a whole graph.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RelationCounts {
    counts: HashMap<String, RelationCount>,
}

impl RelationCounts {
    /// Computes counts for every node in the graph.
    ///
    /// One BFS per node per sign; fine for a batch job, not a hot path.
    pub fn compute(graph: &RelationGraph) -> Self {
        let mut counts = HashMap::with_capacity(graph.node_count());

        for name in graph.node_names() {
            let mut direct_primary = 0;
            let mut direct_reverse = 0;
            for (_, relation) in graph.relations_of(name) {
                match relation {
                    Relation::Primary => direct_primary += 1,
                    Relation::Reverse => direct_reverse += 1,
                    Relation::Conflict => {}
                }
            }

            counts.insert(
                name.to_string(),
                RelationCount {
                    direct_primary,
                    total_primary: graph.count_transitive(name, Relation::Primary),
                    direct_reverse,
                    total_reverse: graph.count_transitive(name, Relation::Reverse),
                },
            );
        }

        Self { counts }
    }

    /// Gets the counts for a node.
    ///
    /// `None` means the node is unknown, which callers must keep
    /// distinct from a node with zero relations.
    pub fn get(&self, name: &str) -> Option<&RelationCount> {
        self.counts.get(name)
    }

    /// Iterates over all `(name, counts)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationCount)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), count))
    }

    /// Number of nodes in the table.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when the table is empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
