//! Module boundary analysis for headers.
//!
//! For each header, partitions its relations into internal (same
//! module) and external (other module) buckets and derives the
//! external ratio. Headers leaning heavily outward are the raw
//! material for relocation recommendations.

use mortar_graph::{Relation, RelationGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derives a header's owning module from its path.
///
/// Pure string parsing, so the same path always maps to the same
/// module within and across runs:
/// - `boost/asio/detail/pop_options.hpp` -> `asio`
/// - `boost/asio.hpp` -> `asio`
/// - anything not under the root token is returned unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResolver {
    root: String,
}

impl ModuleResolver {
    /// Creates a resolver for the given root token (e.g. "boost").
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the owning module for a header path.
    pub fn resolve(&self, path: &str) -> String {
        let normalized = path.replace('\\', "/");
        let mut parts = normalized.split('/');
        if parts.next() == Some(self.root.as_str()) {
            if let Some(segment) = parts.next() {
                // "asio.hpp" -> "asio"
                let stem = segment.split('.').next().unwrap_or(segment);
                return stem.to_string();
            }
        }
        normalized
    }

    /// True for the module's umbrella header, `<root>/<module>.<ext>`.
    pub fn is_umbrella(&self, path: &str, module: &str) -> bool {
        let normalized = path.replace('\\', "/");
        let parts: Vec<&str> = normalized.split('/').collect();
        match parts.as_slice() {
            [root, file] if *root == self.root => {
                file.split('.').next() == Some(module)
            }
            _ => false,
        }
    }
}

/// Whether boundary stats describe a plain header or a module's
/// umbrella header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Module,
    Header,
}

/// A relation crossing the module boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRelation {
    pub header: String,
    pub relation: Relation,
    pub module: String,
}

/// Internal/external split of one header's relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryStats {
    /// Owning module, derived from the header path.
    pub module: String,
    pub scope: Scope,
    pub internal: Vec<(String, Relation)>,
    pub external: Vec<ExternalRelation>,
    pub internal_count: usize,
    pub external_count: usize,
    pub total_count: usize,
    /// `external / (internal + external)`; 0 when there are no
    /// relations, and forced to 0 for umbrella headers.
    pub external_ratio: f64,
}

/// Boundary stats per header, sorted by header name.
pub type BoundaryMap = BTreeMap<String, BoundaryStats>;

/// Classifies every header's relations against module boundaries.
///
/// Only headers with at least one relation get an entry.
pub fn analyze_boundaries(headers: &RelationGraph, resolver: &ModuleResolver) -> BoundaryMap {
    let mut map = BoundaryMap::new();

    for header in headers.node_names() {
        let relations = headers.relations_of(header);
        if relations.is_empty() {
            continue;
        }

        let module = resolver.resolve(header);
        let mut internal = Vec::new();
        let mut external = Vec::new();

        for (neighbor, relation) in relations {
            let neighbor_module = resolver.resolve(neighbor);
            if neighbor_module == module {
                internal.push((neighbor.to_string(), relation));
            } else {
                external.push(ExternalRelation {
                    header: neighbor.to_string(),
                    relation,
                    module: neighbor_module,
                });
            }
        }

        // Keep neighbor lists in a reproducible order for reports.
        internal.sort_by(|a, b| a.0.cmp(&b.0));
        external.sort_by(|a, b| a.header.cmp(&b.header));

        let internal_count = internal.len();
        let external_count = external.len();
        let total_count = internal_count + external_count;
        let mut external_ratio = if total_count > 0 {
            external_count as f64 / total_count as f64
        } else {
            0.0
        };

        let scope = if resolver.is_umbrella(header, &module) {
            // The umbrella header names the whole module; its outward
            // reach is module-level, not a relocation signal.
            external_ratio = 0.0;
            Scope::Module
        } else {
            Scope::Header
        };

        map.insert(
            header.to_string(),
            BoundaryStats {
                module,
                scope,
                internal,
                external,
                internal_count,
                external_count,
                total_count,
                external_ratio,
            },
        );
    }

    map
}

/// Rolled-up boundary statistics for one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub module: String,
    pub header_count: usize,
    pub total_internal: usize,
    pub total_external: usize,
    pub total_connections: usize,
    pub external_ratio: f64,
    pub avg_internal_per_header: f64,
    pub avg_external_per_header: f64,
}

/// Summarizes boundaries per module, sorted by external ratio
/// descending (ties by module name).
///
/// Modules with no connections at all are omitted.
pub fn module_summaries(boundaries: &BoundaryMap) -> Vec<ModuleSummary> {
    let mut per_module: BTreeMap<&str, (usize, usize, usize)> = BTreeMap::new();
    for stats in boundaries.values() {
        let entry = per_module.entry(stats.module.as_str()).or_default();
        entry.0 += 1;
        entry.1 += stats.internal_count;
        entry.2 += stats.external_count;
    }

    let mut summaries: Vec<ModuleSummary> = per_module
        .into_iter()
        .filter(|(_, (_, internal, external))| internal + external > 0)
        .map(|(module, (headers, internal, external))| {
            let total = internal + external;
            ModuleSummary {
                module: module.to_string(),
                header_count: headers,
                total_internal: internal,
                total_external: external,
                total_connections: total,
                external_ratio: external as f64 / total as f64,
                avg_internal_per_header: internal as f64 / headers as f64,
                avg_external_per_header: external as f64 / headers as f64,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.external_ratio
            .total_cmp(&a.external_ratio)
            .then_with(|| a.module.cmp(&b.module))
    });

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ModuleResolver {
        ModuleResolver::new("boost")
    }

    #[test]
    fn test_resolve_module_from_path() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("boost/asio/detail/pop_options.hpp"), "asio");
        assert_eq!(resolver.resolve("boost/asio.hpp"), "asio");
        assert_eq!(resolver.resolve("boost/config.hpp"), "config");
        assert_eq!(resolver.resolve(r"boost\align\aligned_alloc.hpp"), "align");
        // Outside the root token the path passes through unchanged.
        assert_eq!(resolver.resolve("vendor/zlib.h"), "vendor/zlib.h");
    }

    #[test]
    fn test_umbrella_detection() {
        let resolver = resolver();
        assert!(resolver.is_umbrella("boost/asio.hpp", "asio"));
        assert!(!resolver.is_umbrella("boost/asio/io_context.hpp", "asio"));
        assert!(!resolver.is_umbrella("boost/config.hpp", "asio"));
    }

    fn sample_graph() -> RelationGraph {
        let mut graph = RelationGraph::new();
        // One header in asio touching one internal and two external
        // neighbors, with mirrored entries.
        graph.add_relation(
            "boost/asio/io_context.hpp",
            "boost/asio/detail/config.hpp",
            Relation::Reverse,
        );
        graph.add_relation(
            "boost/asio/detail/config.hpp",
            "boost/asio/io_context.hpp",
            Relation::Primary,
        );
        graph.add_relation(
            "boost/asio/io_context.hpp",
            "boost/config.hpp",
            Relation::Reverse,
        );
        graph.add_relation(
            "boost/config.hpp",
            "boost/asio/io_context.hpp",
            Relation::Primary,
        );
        graph.add_relation(
            "boost/asio/io_context.hpp",
            "boost/system/error_code.hpp",
            Relation::Reverse,
        );
        graph.add_relation(
            "boost/system/error_code.hpp",
            "boost/asio/io_context.hpp",
            Relation::Primary,
        );
        graph
    }

    #[test]
    fn test_internal_external_split() {
        let boundaries = analyze_boundaries(&sample_graph(), &resolver());
        let stats = &boundaries["boost/asio/io_context.hpp"];

        assert_eq!(stats.module, "asio");
        assert_eq!(stats.scope, Scope::Header);
        assert_eq!(stats.internal_count, 1);
        assert_eq!(stats.external_count, 2);
        assert_eq!(stats.total_count, 3);
        assert!((stats.external_ratio - 2.0 / 3.0).abs() < 1e-9);

        let external_modules: Vec<&str> =
            stats.external.iter().map(|e| e.module.as_str()).collect();
        assert_eq!(external_modules, vec!["config", "system"]);
    }

    #[test]
    fn test_ratio_bounds_and_zero_external() {
        let mut graph = RelationGraph::new();
        graph.add_relation(
            "boost/align/align.hpp",
            "boost/align/detail/align.hpp",
            Relation::Reverse,
        );
        let boundaries = analyze_boundaries(&graph, &resolver());

        for (header, stats) in &boundaries {
            assert!(
                (0.0..=1.0).contains(&stats.external_ratio),
                "ratio out of bounds for {}",
                header
            );
            if stats.external_count == 0 {
                assert_eq!(stats.external_ratio, 0.0);
            }
        }
    }

    #[test]
    fn test_umbrella_ratio_forced_to_zero() {
        let mut graph = RelationGraph::new();
        graph.add_relation("boost/asio.hpp", "boost/config.hpp", Relation::Reverse);
        graph.add_relation("boost/config.hpp", "boost/asio.hpp", Relation::Primary);

        let boundaries = analyze_boundaries(&graph, &resolver());
        let umbrella = &boundaries["boost/asio.hpp"];
        assert_eq!(umbrella.scope, Scope::Module);
        assert_eq!(umbrella.external_count, 1);
        assert_eq!(umbrella.external_ratio, 0.0);
    }

    #[test]
    fn test_module_summaries_rollup() {
        let boundaries = analyze_boundaries(&sample_graph(), &resolver());
        let summaries = module_summaries(&boundaries);

        let asio = summaries.iter().find(|s| s.module == "asio").unwrap();
        assert_eq!(asio.header_count, 2);
        assert_eq!(asio.total_internal + asio.total_external, asio.total_connections);
        assert!((0.0..=1.0).contains(&asio.external_ratio));

        // Sorted by external ratio descending.
        for pair in summaries.windows(2) {
            assert!(pair[0].external_ratio >= pair[1].external_ratio);
        }
    }
}
