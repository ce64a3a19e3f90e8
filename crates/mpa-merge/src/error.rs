//! Error types for table merging.

use std::path::PathBuf;

use mpa_ingest::IngestError;
use thiserror::Error;

/// Errors that abort a merge.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Fewer than two tables were supplied.
    #[error("need at least two tables to merge, got {count}")]
    InsufficientInput { count: usize },

    /// Loading one of the input tables failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Two inputs carry the same sample identifier.
    #[error("sample '{sample_id}' appears in both {first} and {second}")]
    DuplicateSample {
        sample_id: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A table's taxon key has a different number of columns.
    #[error("{path} has {found} key column(s), expected {expected}")]
    KeyArityMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    // === Output Errors ===
    /// Output exists and overwriting was not allowed.
    #[error("output file '{path}' already exists and overwrite is not allowed")]
    OutputExists { path: PathBuf },

    /// Failed to write the merged table.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for MergeError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_input_display() {
        let err = MergeError::InsufficientInput { count: 1 };
        assert_eq!(err.to_string(), "need at least two tables to merge, got 1");
    }

    #[test]
    fn test_ingest_error_is_transparent() {
        let err: MergeError = IngestError::FileNotFound {
            path: PathBuf::from("a.tsv"),
        }
        .into();
        assert_eq!(err.to_string(), "table not found: a.tsv");
    }
}
