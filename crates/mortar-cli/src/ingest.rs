//! CSV ingest for the dependency export.
//!
//! One row per observed relation: `Operation, Module_A, Module_B,
//! Header, From`. The table is noisy by nature — rows that fail to
//! deserialize are dropped with a debug note, never an error. Only
//! I/O and CSV-structure failures abort the load.

use csv::ReaderBuilder;
use mortar_graph::RawRecord;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row as written by the dependency extraction tool.
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "Operation")]
    operation: String,

    /// Source module.
    #[serde(rename = "Module_A")]
    module_a: String,

    /// Target module.
    #[serde(rename = "Module_B")]
    module_b: String,

    /// Header path from Module_B.
    #[serde(rename = "Header", default)]
    header: String,

    /// Space-separated header paths from Module_A.
    #[serde(rename = "From", default)]
    from: String,
}

impl Row {
    fn into_record(self) -> RawRecord {
        let header = self.header.trim();
        RawRecord {
            operation: self.operation,
            source_module: self.module_a,
            target_module: self.module_b,
            header: (!header.is_empty()).then(|| header.to_string()),
            origin_headers: self.from.split_whitespace().map(String::from).collect(),
        }
    }
}

/// Reads all well-formed records from a dependency CSV.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>, IngestError> {
    let mut contents = fs::read_to_string(path)?;
    // Exports from Windows tooling tend to carry a BOM.
    if let Some(stripped) = contents.strip_prefix('\u{feff}') {
        contents = stripped.to_string();
    }

    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.deserialize::<Row>() {
        match row {
            Ok(row) => records.push(row.into_record()),
            Err(err) => {
                debug!("dropping malformed CSV row: {}", err);
                dropped += 1;
            }
        }
    }

    debug!(
        records = records.len(),
        dropped,
        "loaded dependency export from {}",
        path.display()
    );

    Ok(records)
}
