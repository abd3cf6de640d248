//! Relocation recommendation for individual headers.
//!
//! A header that talks mostly to another module probably belongs
//! there. Each header is evaluated independently against a set of
//! thresholds; headers with conflicted or dangling relations are never
//! recommended — moving one of those alone would break its partner,
//! so they surface only as notices.

use crate::boundary::{BoundaryMap, BoundaryStats, Scope};
use mortar_graph::RelationModel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Stand-in for an infinite improvement ratio when computing the
/// benefit score, keeping scores orderable.
const CAPPED_RATIO: f64 = 100.0;

/// Gates a header must pass before a relocation is recommended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelocationThresholds {
    /// Headers with fewer total relations are ignored.
    pub min_total_connections: usize,

    /// Minimum share of external relations, 0 to 1.
    pub min_external_ratio: f64,

    /// Minimum `target_connections / internal_count`. A header with
    /// no internal connections always passes this gate.
    pub min_improvement_ratio: f64,
}

impl Default for RelocationThresholds {
    fn default() -> Self {
        Self {
            min_total_connections: 5,
            min_external_ratio: 0.6,
            min_improvement_ratio: 1.5,
        }
    }
}

/// A recommendation to move one header to another module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelocationRecommendation {
    pub header: String,
    pub current_module: String,
    pub target_module: String,
    pub current_internal: usize,
    pub current_external: usize,
    /// Relations to the proposed target module.
    pub target_connections: usize,
    /// `target_connections / current_internal`; infinite when the
    /// header has no internal connections.
    pub improvement_ratio: f64,
    pub current_external_ratio: f64,
    /// External ratio after the move: relations to the target become
    /// internal, everything else external.
    pub new_external_ratio: f64,
    pub external_ratio_improvement: f64,
    pub total_connections: usize,
    pub benefit_score: f64,
    /// Remaining external modules and their relation counts, for
    /// report rendering.
    pub other_external_modules: BTreeMap<String, usize>,
}

/// Actionable recommendations plus the notice lists callers must
/// render separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelocationReport {
    /// Sorted by benefit score descending.
    pub recommendations: Vec<RelocationRecommendation>,

    /// Headers with bidirectional relations; relocate together or
    /// refactor first.
    pub conflicts: BTreeMap<String, Vec<String>>,

    /// Headers referencing a header that does not exist.
    pub dangling: BTreeMap<String, String>,
}

/// Evaluates one header against the thresholds.
///
/// Returns `None` whenever any gate fails; exclusion-set filtering is
/// the caller's job (see [`recommend_relocations`]).
pub fn evaluate_relocation(
    header: &str,
    stats: &BoundaryStats,
    thresholds: &RelocationThresholds,
) -> Option<RelocationRecommendation> {
    if stats.scope == Scope::Module {
        return None;
    }
    if stats.total_count < thresholds.min_total_connections {
        return None;
    }
    if stats.external_ratio < thresholds.min_external_ratio {
        return None;
    }

    let mut external_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for relation in &stats.external {
        *external_counts.entry(relation.module.as_str()).or_insert(0) += 1;
    }
    // Max count; BTreeMap iteration makes the tie-break the first
    // module name in sorted order.
    let (target_module, target_connections) = external_counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(module, count)| (module.to_string(), *count))?;

    if target_module == stats.module {
        return None;
    }

    let improvement_ratio = if stats.internal_count == 0 {
        if target_connections > 0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        target_connections as f64 / stats.internal_count as f64
    };

    if improvement_ratio < thresholds.min_improvement_ratio && stats.internal_count > 0 {
        return None;
    }

    let total = stats.total_count as f64;
    let new_external = stats.total_count - target_connections;
    let new_external_ratio = new_external as f64 / total;

    let capped_ratio = if improvement_ratio.is_finite() {
        improvement_ratio
    } else {
        CAPPED_RATIO
    };
    let benefit_score = capped_ratio * 2.0
        + (stats.external_ratio - new_external_ratio) * 100.0
        + target_connections as f64 / total * 50.0;

    let other_external_modules = external_counts
        .into_iter()
        .filter(|(module, _)| *module != target_module)
        .map(|(module, count)| (module.to_string(), count))
        .collect();

    Some(RelocationRecommendation {
        header: header.to_string(),
        current_module: stats.module.clone(),
        target_module,
        current_internal: stats.internal_count,
        current_external: stats.external_count,
        target_connections,
        improvement_ratio,
        current_external_ratio: stats.external_ratio,
        new_external_ratio,
        external_ratio_improvement: stats.external_ratio - new_external_ratio,
        total_connections: stats.total_count,
        benefit_score,
        other_external_modules,
    })
}

/// Evaluates every header and assembles the report.
///
/// The model's conflict and dangling headers are excluded from the
/// recommendation list and passed through as notices.
pub fn recommend_relocations(
    boundaries: &BoundaryMap,
    model: &RelationModel,
    thresholds: &RelocationThresholds,
) -> RelocationReport {
    let excluded: HashSet<&str> = model
        .conflicts
        .keys()
        .chain(model.dangling.keys())
        .map(String::as_str)
        .collect();

    let mut recommendations: Vec<RelocationRecommendation> = boundaries
        .iter()
        .filter(|(header, _)| !excluded.contains(header.as_str()))
        .filter_map(|(header, stats)| evaluate_relocation(header, stats, thresholds))
        .collect();

    recommendations.sort_by(|a, b| {
        b.benefit_score
            .total_cmp(&a.benefit_score)
            .then_with(|| a.header.cmp(&b.header))
    });

    debug!(
        candidates = boundaries.len(),
        recommended = recommendations.len(),
        excluded = excluded.len(),
        "relocation analysis complete"
    );

    RelocationReport {
        recommendations,
        conflicts: model.conflicts.clone(),
        dangling: model.dangling.clone(),
    }
}
