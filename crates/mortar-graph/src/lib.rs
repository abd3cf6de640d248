//! Mortar Graph - Signed dependency relation graphs
//!
//! This crate turns a raw module/header dependency export into two
//! relation graphs: module-to-module and header-to-header. Each
//! ordered pair carries one signed relation (primary, reverse, or
//! conflict when both directions were observed), and per-node counts
//! cover both direct neighbors and the transitive closure per sign.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with a name index for lookups.
//! The builder accumulates raw observations, mirrors the implied
//! opposite direction, and collapses once at the end — so the result
//! is independent of row order.
//!
//! # Example
//!
//! ```no_run
//! use mortar_graph::{GraphBuilder, RawRecord, Relation};
//!
//! let record = RawRecord {
//!     operation: "Primary".to_string(),
//!     source_module: "asio".to_string(),
//!     target_module: "config".to_string(),
//!     header: None,
//!     origin_headers: Vec::new(),
//! };
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_record(&record);
//! let model = builder.build();
//!
//! assert_eq!(model.modules.relation("asio", "config"), Some(Relation::Primary));
//! ```

mod builder;
mod closure;
mod counts;
mod graph;
mod relation;

pub use builder::{GraphBuilder, RelationModel};
pub use counts::{RelationCount, RelationCounts};
pub use graph::{GraphStats, NodeId, RelationGraph};
pub use relation::{NodeKind, Operation, OperationSet, ParseOperationError, RawRecord, Relation};
