//! Mortar Analysis - Coupling analysis over relation graphs
//!
//! Consumes the read-only relation graphs built by `mortar-graph` and
//! produces the two recommendation streams:
//!
//! - **Merge**: which small groups of modules (or headers) would, if
//!   merged, remove the most duplicate outgoing edges while sharing
//!   the most dependencies.
//! - **Relocation**: which individual headers talk so much to another
//!   module that they should move there.
//!
//! Candidate scoring is embarrassingly parallel and fans out with
//! rayon; ranking and the greedy non-overlapping selection are
//! sequential by nature.

mod boundary;
mod combine;
mod damage;
mod edges;
mod merge;
mod relocate;

pub use boundary::{
    analyze_boundaries, module_summaries, BoundaryMap, BoundaryStats, ExternalRelation,
    ModuleResolver, ModuleSummary, Scope,
};
pub use combine::{candidate_pool, combinations, Combinations};
pub use damage::{score_group, DamageMetrics};
pub use edges::{estimate_edges, EdgeMetrics};
pub use merge::{recommend_merges, MergeConfig, MergeImpact, MergePlan, MergeRecommendation};
pub use relocate::{
    evaluate_relocation, recommend_relocations, RelocationRecommendation, RelocationReport,
    RelocationThresholds,
};
