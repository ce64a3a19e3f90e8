//! The join command: load, merge, write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use mpa_merge::{
    MIN_TABLES, MergeError, MergeOptions, RunSummary, TracingSink, ensure_writable, merge,
    write_merged_table,
};
use tracing::info;

/// Exit code for a failed run.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code when the output exists and overwriting was not requested.
pub const EXIT_OUTPUT_EXISTS: i32 = 2;

/// Parameters of one join run.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub tables: Vec<PathBuf>,
    pub outfile: PathBuf,
    pub overwrite: bool,
    pub fill_value: f64,
}

/// What a successful run produced.
#[derive(Debug)]
pub struct JoinOutcome {
    pub outfile: PathBuf,
    pub rows: usize,
    pub samples: Vec<String>,
    pub summary: RunSummary,
}

/// Merges `request.tables` and writes the result to `request.outfile`.
///
/// Nothing is written unless every input loads. The output is checked for
/// existence after merging, right before it is opened.
pub fn run_join(request: &JoinRequest) -> Result<JoinOutcome> {
    if request.tables.len() < MIN_TABLES {
        return Err(MergeError::InsufficientInput {
            count: request.tables.len(),
        }
        .into());
    }

    let options = MergeOptions::default().with_fill_value(request.fill_value);
    let (table, summary) =
        merge(&request.tables, &options, &mut TracingSink).context("join tables")?;

    ensure_writable(&request.outfile, request.overwrite)?;
    write_merged_table(&table, &request.outfile, request.overwrite)
        .with_context(|| format!("write {}", request.outfile.display()))?;

    info!(
        tables = summary.table_count(),
        rows = table.row_count(),
        "joined tables"
    );
    Ok(JoinOutcome {
        outfile: request.outfile.clone(),
        rows: table.row_count(),
        samples: table.samples().to_vec(),
        summary,
    })
}

/// Maps a run error to the process exit code.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<MergeError>() {
        Some(MergeError::OutputExists { .. }) => EXIT_OUTPUT_EXISTS,
        _ => EXIT_FAILURE,
    }
}
