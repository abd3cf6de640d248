//! Transitive closure counting over same-signed edges.
//!
//! Answers "how many nodes are reachable from here through Primary
//! edges only" (and the Reverse mirror). Conflict edges are never
//! traversed: a conflicted pair gives no usable direction.

use crate::graph::{NodeId, RelationGraph};
use crate::relation::Relation;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashSet, VecDeque};

impl RelationGraph {
    /// Counts the distinct nodes reachable from `start` via edges of
    /// exactly `relation`, excluding `start` itself.
    ///
    /// Breadth-first: the frontier is seeded with the like-signed
    /// direct neighbors, and expansion only follows edges of the same
    /// sign. Returns 0 for an unknown start node or one with no
    /// like-signed neighbors. Bounded by graph size; `start` is in the
    /// visited set from the beginning, so cycles back to it do not
    /// count.
    pub fn count_transitive(&self, start: &str, relation: Relation) -> usize {
        let Some(start_index) = self.index_of(start) else {
            return 0;
        };

        let mut visited: HashSet<NodeId> = HashSet::new();
        visited.insert(start_index);

        let mut queue: VecDeque<NodeId> = VecDeque::new();
        for neighbor in self.signed_neighbors(start_index, relation) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }

        let mut count = queue.len();
        while let Some(current) = queue.pop_front() {
            for neighbor in self.signed_neighbors(current, relation) {
                if visited.insert(neighbor) {
                    count += 1;
                    queue.push_back(neighbor);
                }
            }
        }

        count
    }

    /// Outgoing neighbors connected by an edge of exactly `relation`.
    fn signed_neighbors(
        &self,
        index: NodeId,
        relation: Relation,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.graph
            .edges_directed(index, Direction::Outgoing)
            .filter(move |edge| *edge.weight() == relation)
            .map(|edge| edge.target())
    }
}
