//! Sequential outer-join accumulation of sample tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mpa_ingest::{SampleTable, read_sample_table};
use tracing::info_span;

use crate::diagnostics::{DiagnosticsSink, MergeEvent};
use crate::error::{MergeError, Result};
use crate::options::{MIN_TABLES, MergeOptions};
use crate::summary::RunSummary;
use crate::table::MergedTable;

/// Folds sample tables into a [`MergedTable`] one at a time.
///
/// Each pushed table is joined immediately and then dropped. Sample columns
/// appear in push order; row order is the sorted key union.
#[derive(Debug, Default)]
pub struct TableMerger {
    merged: Option<MergedTable>,
    summary: RunSummary,
    sample_paths: BTreeMap<String, PathBuf>,
}

impl TableMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins `table` into the accumulated result.
    ///
    /// The first table fixes the key column names. Later tables must have the
    /// same number of key columns; differing names only produce a warning.
    pub fn push(&mut self, table: SampleTable, sink: &mut dyn DiagnosticsSink) -> Result<()> {
        if let Some(first) = self.sample_paths.get(table.sample_id()) {
            return Err(MergeError::DuplicateSample {
                sample_id: table.sample_id().to_string(),
                first: first.clone(),
                second: table.path().to_path_buf(),
            });
        }

        let merged = self
            .merged
            .get_or_insert_with(|| MergedTable::new(table.key_columns().to_vec()));
        if table.key_columns().len() != merged.key_columns().len() {
            return Err(MergeError::KeyArityMismatch {
                path: table.path().to_path_buf(),
                expected: merged.key_columns().len(),
                found: table.key_columns().len(),
            });
        }
        if table.key_columns() != merged.key_columns() {
            sink.record(MergeEvent::KeyColumnsDiffer {
                path: table.path().to_path_buf(),
                expected: merged.key_columns().to_vec(),
                found: table.key_columns().to_vec(),
            });
        }

        let record = self.summary.observe(&table);
        sink.record(MergeEvent::TableLoaded {
            path: record.path.clone(),
            sample_id: record.sample_id.clone(),
            variant: record.variant,
            rows: record.rows,
        });
        self.sample_paths
            .insert(table.sample_id().to_string(), table.path().to_path_buf());
        merged.join_outer(table);
        Ok(())
    }

    /// Number of tables joined so far.
    pub fn table_count(&self) -> usize {
        self.summary.table_count()
    }

    /// Reports the run summary, fills missing cells and returns the result.
    ///
    /// Fails with [`MergeError::InsufficientInput`] if fewer than
    /// [`MIN_TABLES`] tables were pushed.
    pub fn finish(
        self,
        fill: f64,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<(MergedTable, RunSummary)> {
        let count = self.table_count();
        let Some(mut merged) = self.merged.filter(|_| count >= MIN_TABLES) else {
            return Err(MergeError::InsufficientInput { count });
        };

        self.summary.report(sink);
        merged.fill_missing(fill);
        sink.record(MergeEvent::OutputRows {
            rows: merged.row_count(),
        });
        Ok((merged, self.summary))
    }
}

/// Loads every table in `paths` (in order) and merges them.
///
/// Requires at least [`MIN_TABLES`] paths; the check happens before any file
/// is opened. Any load failure aborts the whole merge.
pub fn merge<P: AsRef<Path>>(
    paths: &[P],
    options: &MergeOptions,
    sink: &mut dyn DiagnosticsSink,
) -> Result<(MergedTable, RunSummary)> {
    if paths.len() < MIN_TABLES {
        return Err(MergeError::InsufficientInput { count: paths.len() });
    }

    let span = info_span!("merge", tables = paths.len());
    let _guard = span.enter();

    let mut merger = TableMerger::new();
    for path in paths {
        let table = read_sample_table(path.as_ref())?;
        merger.push(table, sink)?;
    }
    merger.finish(options.fill_value, sink)
}
