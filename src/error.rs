//! Custom error types for ap-insight
//!
//! This module defines the error hierarchy for the pipeline using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for ap-insight operations
#[derive(Error, Debug)]
pub enum ApError {
    /// No source workbook found in the raw-input directory
    #[error("No source workbook (*.xlsx) found in {}", .dir.display())]
    MissingInput {
        /// The raw-input directory that was searched
        dir: PathBuf,
    },

    /// A column required by an aggregation stage is absent
    #[error("Required column missing: {column}")]
    MissingColumn {
        /// Name of the missing column
        column: &'static str,
    },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Workbook parsing errors
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Delimited-text read/write errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors (artifact files on disk)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApError {
    /// Check if this is a missing-input error
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }

    /// Create a missing-column error
    pub fn missing_column(column: &'static str) -> Self {
        Self::MissingColumn { column }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ApError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for ApError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for ApError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<calamine::XlsxError> for ApError {
    fn from(err: calamine::XlsxError) -> Self {
        Self::Workbook(err.to_string())
    }
}

/// Result type alias for ap-insight operations
pub type ApResult<T> = Result<T, ApError>;
