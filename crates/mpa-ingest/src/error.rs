//! Error types for abundance table ingestion.

use std::path::PathBuf;
use thiserror::Error;

use crate::layout::LayoutError;
use crate::table::TaxonKey;

/// Errors that can occur while loading a single abundance table.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input table not found.
    #[error("table not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Layout Errors ===
    /// The first lines of the file match no known layout.
    #[error("unsupported table layout in {path}: {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: LayoutError,
    },

    // === Parsing Errors ===
    /// Failed to parse the data rows with Polars.
    #[error("failed to parse table {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// A data row leaves some, but not all, key columns empty.
    #[error("data row {row} in {path} has no value for key column '{column}'")]
    MissingKey {
        path: PathBuf,
        row: usize,
        column: String,
    },

    /// The abundance column holds a value that is not a number.
    #[error("value column '{column}' in {path} is not numeric: '{value}'")]
    NonNumericValue {
        path: PathBuf,
        column: String,
        value: String,
    },

    /// The same taxon key appears more than once in one table.
    #[error("duplicate taxon '{key}' in {path}")]
    DuplicateTaxon { path: PathBuf, key: TaxonKey },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    /// Returns the layout error if this is a detection failure.
    pub fn layout_error(&self) -> Option<&LayoutError> {
        match self {
            Self::Layout { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
