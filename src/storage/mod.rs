//! Artifact storage layer
//!
//! Reads and writes the delimited artifacts under `data/processed/`. All
//! writes go through the atomic retry-tolerant writer in [`file_io`].

pub mod file_io;

use std::path::{Path, PathBuf};

use crate::error::{ApError, ApResult};
use crate::models::InvoiceRecord;

pub use file_io::{write_csv_atomic, write_json};

/// Read a cleaned invoice table from disk
///
/// The cache is expected to be a product of this tool, so rows that fail
/// typed deserialization are a storage error, not a cleaning concern.
pub fn read_clean_csv(path: &Path) -> ApResult<Vec<InvoiceRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ApError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    // Aggregation cannot proceed without these, so fail the stage up front
    const REQUIRED: [&str; 5] = ["APID", "InvoiceDate", "DueDate", "Amount", "Currency"];
    let headers = reader
        .headers()
        .map_err(|e| ApError::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
    for column in REQUIRED {
        if !headers.iter().any(|h| h == column) {
            return Err(ApError::missing_column(column));
        }
    }

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: InvoiceRecord = row
            .map_err(|e| ApError::Storage(format!("Failed to parse {}: {}", path.display(), e)))?;
        records.push(record);
    }
    Ok(records)
}

/// Persist a cleaned invoice table, returning the path actually written
pub fn write_clean_csv(path: &Path, records: &[InvoiceRecord]) -> ApResult<PathBuf> {
    write_csv_atomic(path, records)
}
