//! Merge recommendation: sweep, score, rank, select.
//!
//! The sweep enumerates every candidate group across the configured
//! size range and scores each one independently — that part fans out
//! across threads. Ranking and the greedy non-overlapping selection
//! stay sequential: whether a group is admissible depends on what was
//! already selected.

use crate::combine::{candidate_pool, combinations};
use crate::damage::{score_group, DamageMetrics};
use crate::edges::{estimate_edges, EdgeMetrics};
use mortar_graph::{RelationCounts, RelationGraph};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Tuning knobs for the merge sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Smallest group size to evaluate.
    pub min_size: usize,

    /// Largest group size to evaluate.
    pub max_size: usize,

    /// Candidate pool bound; the sweep covers C(pool, k) groups per
    /// size, so this is the main cost lever.
    pub candidate_limit: usize,

    /// Total recommendations to return.
    pub top_n: usize,

    /// Soft cap on recommendations of any single group size, to keep
    /// size diversity in the final list.
    pub per_size_cap: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_size: 2,
            max_size: 5,
            candidate_limit: 40,
            top_n: 10,
            per_size_cap: 3,
        }
    }
}

/// One recommended merge group with its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRecommendation {
    /// Member names, sorted, so permutations collapse to one key.
    pub group: Vec<String>,
    pub damage: DamageMetrics,
    pub edges: EdgeMetrics,
}

/// Whole-plan effect of applying every recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeImpact {
    pub original_edges: usize,
    pub reduced_edges: usize,
    pub edge_reduction: usize,
    pub nodes_merged: usize,
}

/// The ranked, non-overlapping merge plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergePlan {
    pub pool_size: usize,
    pub candidates_evaluated: usize,
    pub recommendations: Vec<MergeRecommendation>,
    pub impact: MergeImpact,
}

/// Computes the ranked merge plan for a graph.
///
/// An empty candidate pool, or sizes larger than the pool, produce an
/// empty plan rather than an error.
pub fn recommend_merges(
    graph: &RelationGraph,
    counts: &RelationCounts,
    config: &MergeConfig,
) -> MergePlan {
    let pool = candidate_pool(graph, counts, config.candidate_limit);
    debug!(
        pool = pool.len(),
        min = config.min_size,
        max = config.max_size,
        "starting merge sweep"
    );

    let mut groups: Vec<Vec<String>> = Vec::new();
    for k in config.min_size..=config.max_size {
        for mut group in combinations(&pool, k) {
            group.sort_unstable();
            groups.push(group);
        }
    }
    let candidates_evaluated = groups.len();

    // Scoring reads the graph and counts immutably; each group is
    // independent of every other.
    let mut scored: Vec<MergeRecommendation> = groups
        .into_par_iter()
        .map(|group| {
            let damage = score_group(&group, graph, counts);
            let edges = estimate_edges(&group, graph);
            MergeRecommendation {
                group,
                damage,
                edges,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.edges
            .edge_reduction
            .cmp(&a.edges.edge_reduction)
            .then_with(|| a.group.cmp(&b.group))
    });

    let recommendations = select_non_overlapping(scored, config);
    let impact = overall_impact(&recommendations, graph);

    debug!(
        evaluated = candidates_evaluated,
        selected = recommendations.len(),
        "merge sweep complete"
    );

    MergePlan {
        pool_size: pool.len(),
        candidates_evaluated,
        recommendations,
        impact,
    }
}

/// Greedy walk over the ranked list: no node may appear in two
/// selected groups, and each group size is capped.
fn select_non_overlapping(
    ranked: Vec<MergeRecommendation>,
    config: &MergeConfig,
) -> Vec<MergeRecommendation> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut per_size: HashMap<usize, usize> = HashMap::new();
    let mut selected = Vec::new();

    for candidate in ranked {
        if selected.len() >= config.top_n {
            break;
        }
        let size_count = per_size.entry(candidate.group.len()).or_insert(0);
        if *size_count >= config.per_size_cap {
            continue;
        }
        if candidate.group.iter().any(|member| seen.contains(member)) {
            continue;
        }
        seen.extend(candidate.group.iter().cloned());
        *size_count += 1;
        selected.push(candidate);
    }

    selected
}

/// Sums the effect of the selected merges against the full graph.
fn overall_impact(recommendations: &[MergeRecommendation], graph: &RelationGraph) -> MergeImpact {
    let original_edges: usize = graph
        .node_names()
        .map(|name| graph.degree(name))
        .sum();

    let mut reduced_edges = original_edges;
    let mut merged: HashSet<&str> = HashSet::new();
    for recommendation in recommendations {
        reduced_edges -= recommendation.edges.edge_reduction;
        merged.extend(recommendation.group.iter().map(String::as_str));
    }

    MergeImpact {
        original_edges,
        reduced_edges,
        edge_reduction: original_edges - reduced_edges,
        nodes_merged: merged.len(),
    }
}
