//! Relation vocabulary for the dependency graph.
//!
//! A dependency export lists one observation per row: an operation
//! (Primary or Reverse) between a source and a target. Observations
//! collapse into a single signed relation per ordered pair, and the
//! sign convention differs between module-level and header-level
//! graphs. That asymmetry is intentional and lives in exactly one
//! place: [`NodeKind::relation_for`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A raw observation kind as it appears in the input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// The source references the target.
    Primary,

    /// The implied inverse: the target references the source.
    Reverse,
}

impl Operation {
    /// Returns the implied opposite operation.
    ///
    /// The input table lists only one direction per row; the other
    /// direction is always recorded with the opposite kind.
    pub fn opposite(self) -> Self {
        match self {
            Operation::Primary => Operation::Reverse,
            Operation::Reverse => Operation::Primary,
        }
    }
}

/// Error for operation keywords outside Primary/Reverse.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized operation keyword: {0:?}")]
pub struct ParseOperationError(pub String);

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Operation::Primary),
            "reverse" => Ok(Operation::Reverse),
            other => Err(ParseOperationError(other.to_string())),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Primary => write!(f, "Primary"),
            Operation::Reverse => write!(f, "Reverse"),
        }
    }
}

/// The collapsed, signed relation between an ordered pair of nodes.
///
/// Whenever both `rel(A, B)` and `rel(B, A)` exist they are exact
/// opposites, except when both operation kinds were observed for the
/// pair, in which case both entries are `Conflict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Only Primary observed; numeric value +1.
    Primary,

    /// Only Reverse observed; numeric value -1.
    Reverse,

    /// Both directions observed; a cycle between the pair. Value 0.
    Conflict,
}

impl Relation {
    /// The signed integer value used in exported relation tables.
    pub fn value(self) -> i8 {
        match self {
            Relation::Primary => 1,
            Relation::Reverse => -1,
            Relation::Conflict => 0,
        }
    }

    /// The relation seen from the other end of the pair.
    pub fn opposite(self) -> Self {
        match self {
            Relation::Primary => Relation::Reverse,
            Relation::Reverse => Relation::Primary,
            Relation::Conflict => Relation::Conflict,
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Relation::Primary => "primary",
            Relation::Reverse => "reverse",
            Relation::Conflict => "conflict",
        };
        write!(f, "{}", s)
    }
}

/// The set of operation kinds observed for one ordered pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationSet {
    primary: bool,
    reverse: bool,
}

impl OperationSet {
    /// Records one observation.
    pub fn record(&mut self, op: Operation) {
        match op {
            Operation::Primary => self.primary = true,
            Operation::Reverse => self.reverse = true,
        }
    }

    /// True when no observation has been recorded.
    pub fn is_empty(&self) -> bool {
        !self.primary && !self.reverse
    }

    fn both(&self) -> bool {
        self.primary && self.reverse
    }
}

/// The granularity a relation graph is built at.
///
/// Module graphs and header graphs collapse the same operation sets
/// with mirrored sign conventions: at module level a lone Primary
/// observation is a `Primary` relation, at header level it is a
/// `Reverse` relation. Downstream consumers read reverse-signed
/// adjacency with the same meaning at both levels only because of
/// this inversion, so it must not be "fixed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A library/module grouping many headers.
    Module,

    /// A single header file belonging to exactly one module.
    Header,
}

impl NodeKind {
    /// Collapses an observed operation set into a signed relation.
    ///
    /// Returns `None` for an empty set (no observation, no relation).
    pub fn relation_for(self, ops: OperationSet) -> Option<Relation> {
        if ops.is_empty() {
            return None;
        }
        if ops.both() {
            return Some(Relation::Conflict);
        }
        let relation = match (self, ops.primary) {
            (NodeKind::Module, true) => Relation::Primary,
            (NodeKind::Module, false) => Relation::Reverse,
            (NodeKind::Header, true) => Relation::Reverse,
            (NodeKind::Header, false) => Relation::Primary,
        };
        Some(relation)
    }
}

/// One row of the dependency export, as handed to the builder.
///
/// `header` is a file path belonging to the target module;
/// `origin_headers` are paths belonging to the source module that
/// trigger the relation. Both are optional: module-only rows still
/// contribute to the module graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Operation keyword as written in the table; parsed leniently.
    pub operation: String,
    pub source_module: String,
    pub target_module: String,
    pub header: Option<String>,
    pub origin_headers: Vec<String>,
}
