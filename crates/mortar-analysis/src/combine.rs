//! Candidate enumeration: k-combinations over a bounded pool.
//!
//! Combination counts grow as C(n, k), so callers must pre-filter the
//! pool (see [`candidate_pool`]) before enumerating. The iterator is
//! index-based and owns no shared mutable state, so re-creating it
//! regenerates identical output and scoring can fan out freely.

use mortar_graph::{RelationCounts, RelationGraph};

/// Iterator over all k-combinations of a pool, in lexicographic order
/// of pool index.
#[derive(Debug, Clone)]
pub struct Combinations<'a, T> {
    pool: &'a [T],
    indices: Vec<usize>,
    k: usize,
    done: bool,
}

impl<'a, T> Combinations<'a, T> {
    fn new(pool: &'a [T], k: usize) -> Self {
        let done = k == 0 || k > pool.len();
        Self {
            pool,
            indices: (0..k).collect(),
            k,
            done,
        }
    }
}

impl<'a, T: Clone> Iterator for Combinations<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current: Vec<T> = self.indices.iter().map(|&i| self.pool[i].clone()).collect();

        // Advance: find the rightmost index that can still move.
        let n = self.pool.len();
        let mut i = self.k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] != i + n - self.k {
                self.indices[i] += 1;
                for j in i + 1..self.k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        (1, Some(binomial(self.pool.len(), self.k)))
    }
}

/// Enumerates every k-combination of `pool` without repetition.
pub fn combinations<T: Clone>(pool: &[T], k: usize) -> Combinations<'_, T> {
    Combinations::new(pool, k)
}

/// C(n, k) with saturation, for sizing hints.
fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: usize = 1;
    for i in 0..k {
        result = result.saturating_mul(n - i) / (i + 1);
    }
    result
}

/// Selects the bounded merge-candidate pool for a graph.
///
/// Nodes with at least one direct reverse relation (someone depends on
/// them), ranked by that count descending, ties by name, truncated to
/// `limit`. Keeping the pool to tens of nodes is what makes the
/// combination sweep tractable.
pub fn candidate_pool(
    graph: &RelationGraph,
    counts: &RelationCounts,
    limit: usize,
) -> Vec<String> {
    let mut ranked: Vec<(&str, usize)> = graph
        .node_names()
        .filter_map(|name| {
            let count = counts.get(name)?;
            (count.direct_reverse > 0).then_some((name, count.direct_reverse))
        })
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);
    ranked.into_iter().map(|(name, _)| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortar_graph::Relation;
    use std::collections::HashSet;

    #[test]
    fn test_five_choose_three_yields_ten() {
        let pool = ["a", "b", "c", "d", "e"];
        let groups: Vec<Vec<&str>> = combinations(&pool, 3).collect();

        assert_eq!(groups.len(), 10);
        for group in &groups {
            assert_eq!(group.len(), 3);
        }
        let distinct: HashSet<Vec<&str>> = groups.iter().cloned().collect();
        assert_eq!(distinct.len(), 10);
    }

    #[test]
    fn test_lexicographic_pool_order() {
        let pool = ["a", "b", "c", "d"];
        let groups: Vec<Vec<&str>> = combinations(&pool, 2).collect();
        assert_eq!(
            groups,
            vec![
                vec!["a", "b"],
                vec!["a", "c"],
                vec!["a", "d"],
                vec!["b", "c"],
                vec!["b", "d"],
                vec!["c", "d"],
            ]
        );
    }

    #[test]
    fn test_degenerate_k() {
        let pool = ["a", "b"];
        assert_eq!(combinations(&pool, 0).count(), 0);
        assert_eq!(combinations(&pool, 3).count(), 0);
        assert_eq!(combinations::<&str>(&[], 1).count(), 0);
    }

    #[test]
    fn test_restartable() {
        let pool = ["a", "b", "c"];
        let first: Vec<Vec<&str>> = combinations(&pool, 2).collect();
        let second: Vec<Vec<&str>> = combinations(&pool, 2).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_full_width_combination() {
        let pool = ["a", "b", "c"];
        let groups: Vec<Vec<&str>> = combinations(&pool, 3).collect();
        assert_eq!(groups, vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_candidate_pool_ranks_by_dependents() {
        let mut graph = RelationGraph::new();
        // "hub" has two dependents, "mid" one, "leaf" none.
        graph.add_relation("hub", "mid", Relation::Reverse);
        graph.add_relation("hub", "leaf", Relation::Reverse);
        graph.add_relation("mid", "hub", Relation::Primary);
        graph.add_relation("leaf", "hub", Relation::Primary);
        graph.add_relation("mid", "leaf", Relation::Reverse);
        graph.add_relation("leaf", "mid", Relation::Primary);

        let counts = RelationCounts::compute(&graph);
        let pool = candidate_pool(&graph, &counts, 10);
        assert_eq!(pool, vec!["hub".to_string(), "mid".to_string()]);

        let truncated = candidate_pool(&graph, &counts, 1);
        assert_eq!(truncated, vec!["hub".to_string()]);
    }
}
