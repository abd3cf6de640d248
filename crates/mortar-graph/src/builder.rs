//! Graph builder for constructing relation graphs from raw records.
//!
//! The builder handles the two-pass process:
//! 1. Accumulate operation-kind sets per ordered pair, recording the
//!    implied opposite for the mirrored pair as it goes.
//! 2. Collapse each set into a single signed relation and populate the
//!    module and header graphs.
//!
//! Accumulation is order-independent: feeding the same records in any
//! order produces identical graphs.

use crate::graph::RelationGraph;
use crate::relation::{NodeKind, Operation, OperationSet, RawRecord, Relation};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Everything derived from one pass over the input table.
///
/// The graphs are immutable after build; downstream analysis borrows
/// them read-only. The two notice maps feed the relocation exclusion
/// set and are rendered separately from actionable recommendations.
#[derive(Debug, Default)]
pub struct RelationModel {
    /// Module-to-module relations.
    pub modules: RelationGraph,

    /// Header-to-header relations.
    pub headers: RelationGraph,

    /// Headers with at least one conflicted (bidirectional) relation,
    /// mapped to the sorted list of conflicting headers.
    pub conflicts: BTreeMap<String, Vec<String>>,

    /// Headers referencing a header outside the known universe, mapped
    /// to the first such reference. Empty unless the builder was given
    /// a known-header set.
    pub dangling: BTreeMap<String, String>,
}

/// Builds a [`RelationModel`] from raw dependency records.
pub struct GraphBuilder {
    // BTreeMaps keep the collapse pass deterministic across runs.
    module_ops: BTreeMap<String, BTreeMap<String, OperationSet>>,
    header_ops: BTreeMap<String, BTreeMap<String, OperationSet>>,
    known_headers: Option<HashSet<String>>,
    skipped: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            module_ops: BTreeMap::new(),
            header_ops: BTreeMap::new(),
            known_headers: None,
            skipped: 0,
        }
    }

    /// Supplies the universe of headers known to exist.
    ///
    /// With a universe set, any header referencing a neighbor outside
    /// it is flagged in [`RelationModel::dangling`]. Without one, every
    /// header named by a record is taken to exist.
    pub fn with_known_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Accumulates one record.
    ///
    /// A record with a missing module identifier or an unrecognized
    /// operation keyword is dropped silently; a record without header
    /// fields still contributes at module level.
    pub fn add_record(&mut self, record: &RawRecord) {
        let operation: Operation = match record.operation.parse() {
            Ok(op) => op,
            Err(err) => {
                debug!(source = %record.source_module, "skipping record: {}", err);
                self.skipped += 1;
                return;
            }
        };

        let source = record.source_module.trim();
        let target = record.target_module.trim();
        if source.is_empty() || target.is_empty() {
            debug!("skipping record with missing module identifier");
            self.skipped += 1;
            return;
        }

        self.record_module_ops(source, target, operation);
        self.record_header_ops(record);
    }

    /// Accumulates every record in the iterator.
    pub fn add_records<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        for record in records {
            self.add_record(record);
        }
    }

    /// Number of records dropped as malformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn record_module_ops(&mut self, source: &str, target: &str, operation: Operation) {
        record_op(&mut self.module_ops, source, target, operation);
        record_op(&mut self.module_ops, target, source, operation.opposite());
    }

    /// Header direction is fixed by column semantics: each origin
    /// header includes the target-side header, regardless of the row's
    /// operation keyword.
    fn record_header_ops(&mut self, record: &RawRecord) {
        let Some(header) = record.header.as_deref().map(str::trim) else {
            return;
        };
        if header.is_empty() {
            return;
        }
        for origin in &record.origin_headers {
            let origin = origin.trim();
            if origin.is_empty() {
                continue;
            }
            record_op(&mut self.header_ops, origin, header, Operation::Primary);
            record_op(&mut self.header_ops, header, origin, Operation::Reverse);
        }
    }

    /// Collapses all accumulated observations into the final model.
    pub fn build(self) -> RelationModel {
        let mut model = RelationModel::default();

        collapse(&self.module_ops, NodeKind::Module, &mut model.modules);
        collapse(&self.header_ops, NodeKind::Header, &mut model.headers);

        // Conflict notice: every header pair that collapsed to 0.
        for (header, targets) in &self.header_ops {
            let conflicting: Vec<String> = targets
                .iter()
                .filter(|(_, ops)| {
                    NodeKind::Header.relation_for(**ops) == Some(Relation::Conflict)
                })
                .map(|(name, _)| name.clone())
                .collect();
            if !conflicting.is_empty() {
                model.conflicts.insert(header.clone(), conflicting);
            }
        }

        // Dangling notice: references outside the known universe.
        if let Some(known) = &self.known_headers {
            for (header, targets) in &self.header_ops {
                if let Some(missing) = targets.keys().find(|name| !known.contains(*name)) {
                    model.dangling.insert(header.clone(), missing.clone());
                }
            }
        }

        debug!(
            modules = model.modules.node_count(),
            headers = model.headers.node_count(),
            conflicts = model.conflicts.len(),
            skipped = self.skipped,
            "relation model built"
        );

        model
    }
}

fn record_op(
    ops: &mut BTreeMap<String, BTreeMap<String, OperationSet>>,
    source: &str,
    target: &str,
    operation: Operation,
) {
    ops.entry(source.to_string())
        .or_default()
        .entry(target.to_string())
        .or_default()
        .record(operation);
}

fn collapse(
    ops: &BTreeMap<String, BTreeMap<String, OperationSet>>,
    kind: NodeKind,
    graph: &mut RelationGraph,
) {
    for (source, targets) in ops {
        for (target, set) in targets {
            if let Some(relation) = kind.relation_for(*set) {
                graph.add_relation(source, target, relation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(op: &str, source: &str, target: &str) -> RawRecord {
        RawRecord {
            operation: op.to_string(),
            source_module: source.to_string(),
            target_module: target.to_string(),
            header: None,
            origin_headers: Vec::new(),
        }
    }

    fn record_with_headers(
        op: &str,
        source: &str,
        target: &str,
        header: &str,
        origins: &[&str],
    ) -> RawRecord {
        RawRecord {
            header: Some(header.to_string()),
            origin_headers: origins.iter().map(|s| s.to_string()).collect(),
            ..record(op, source, target)
        }
    }

    #[test]
    fn test_primary_row_mirrors_reverse() {
        let mut builder = GraphBuilder::new();
        builder.add_record(&record("Primary", "core", "config"));
        let model = builder.build();

        assert_eq!(
            model.modules.relation("core", "config"),
            Some(Relation::Primary)
        );
        assert_eq!(
            model.modules.relation("config", "core"),
            Some(Relation::Reverse)
        );
    }

    #[test]
    fn test_both_directions_collapse_to_conflict() {
        let mut builder = GraphBuilder::new();
        builder.add_record(&record("Primary", "a", "b"));
        builder.add_record(&record("Primary", "b", "a"));
        let model = builder.build();

        assert_eq!(model.modules.relation("a", "b"), Some(Relation::Conflict));
        assert_eq!(model.modules.relation("b", "a"), Some(Relation::Conflict));
    }

    #[test]
    fn test_sign_symmetry_invariant() {
        let mut builder = GraphBuilder::new();
        builder.add_record(&record("Primary", "a", "b"));
        builder.add_record(&record("Reverse", "c", "a"));
        builder.add_record(&record("Primary", "b", "c"));
        builder.add_record(&record("Primary", "c", "b"));
        let model = builder.build();

        let names: Vec<&str> = model.modules.node_names().collect();
        for &a in &names {
            for &b in &names {
                let (Some(fwd), Some(rev)) =
                    (model.modules.relation(a, b), model.modules.relation(b, a))
                else {
                    continue;
                };
                assert_eq!(
                    fwd.value(),
                    -rev.value(),
                    "symmetry violated for ({}, {})",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let mut builder = GraphBuilder::new();
        builder.add_record(&record("Sideways", "a", "b"));
        builder.add_record(&record("Primary", "", "b"));
        builder.add_record(&record("Primary", "a", "  "));
        builder.add_record(&record("Primary", "a", "b"));
        assert_eq!(builder.skipped(), 3);

        let model = builder.build();
        assert_eq!(model.modules.node_count(), 2);
        assert_eq!(model.modules.relation("a", "b"), Some(Relation::Primary));
    }

    #[test]
    fn test_header_relations_use_inverted_convention() {
        let mut builder = GraphBuilder::new();
        builder.add_record(&record_with_headers(
            "Primary",
            "asio",
            "config",
            "boost/config.hpp",
            &["boost/asio/io_context.hpp"],
        ));
        let model = builder.build();

        // The origin includes the header: Primary observation on
        // (origin, header) collapses to -1 at header level.
        assert_eq!(
            model
                .headers
                .relation("boost/asio/io_context.hpp", "boost/config.hpp"),
            Some(Relation::Reverse)
        );
        assert_eq!(
            model
                .headers
                .relation("boost/config.hpp", "boost/asio/io_context.hpp"),
            Some(Relation::Primary)
        );
    }

    #[test]
    fn test_mutual_inclusion_is_reported_as_conflict() {
        let mut builder = GraphBuilder::new();
        builder.add_record(&record_with_headers("Primary", "a", "b", "b.hpp", &["a.hpp"]));
        builder.add_record(&record_with_headers("Primary", "b", "a", "a.hpp", &["b.hpp"]));
        let model = builder.build();

        assert_eq!(
            model.headers.relation("a.hpp", "b.hpp"),
            Some(Relation::Conflict)
        );
        assert_eq!(model.conflicts.get("a.hpp"), Some(&vec!["b.hpp".to_string()]));
        assert_eq!(model.conflicts.get("b.hpp"), Some(&vec!["a.hpp".to_string()]));
    }

    #[test]
    fn test_dangling_requires_known_universe() {
        let rows = [record_with_headers(
            "Primary",
            "a",
            "b",
            "b/missing.hpp",
            &["a/real.hpp"],
        )];

        let mut builder = GraphBuilder::new();
        builder.add_records(&rows);
        assert!(builder.build().dangling.is_empty());

        let mut builder = GraphBuilder::new().with_known_headers(["a/real.hpp"]);
        builder.add_records(&rows);
        let model = builder.build();
        assert_eq!(
            model.dangling.get("a/real.hpp"),
            Some(&"b/missing.hpp".to_string())
        );
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let rows = [
            record("Primary", "a", "b"),
            record("Reverse", "b", "c"),
            record("Primary", "c", "a"),
            record("Primary", "a", "c"),
        ];

        let mut forward = GraphBuilder::new();
        forward.add_records(&rows);
        let forward = forward.build();

        let mut backward = GraphBuilder::new();
        backward.add_records(rows.iter().rev());
        let backward = backward.build();

        let mut names: Vec<&str> = forward.modules.node_names().collect();
        names.sort_unstable();
        let mut reversed_names: Vec<&str> = backward.modules.node_names().collect();
        reversed_names.sort_unstable();
        assert_eq!(names, reversed_names);

        for &a in &names {
            for &b in &names {
                assert_eq!(
                    forward.modules.relation(a, b),
                    backward.modules.relation(a, b),
                    "relation ({}, {}) differs by row order",
                    a,
                    b
                );
            }
        }
    }
}
