//! Merging of single-sample abundance tables.
//!
//! Every input table is loaded through [`mpa_ingest`], then folded into one
//! [`MergedTable`] with an outer join on the taxon key. Cells a sample does
//! not report are filled with a single configured value.
//!
//! Diagnostics (table counts, size histogram, layout and database
//! consistency) are written to an explicitly passed [`DiagnosticsSink`];
//! [`TracingSink`] forwards them to `tracing`, [`CollectingSink`] keeps them
//! in memory.
//!
//! # Example
//!
//! ```ignore
//! use mpa_merge::{MergeOptions, TracingSink, merge, write_merged_table};
//!
//! let options = MergeOptions::default().with_fill_value(0.0);
//! let (table, summary) = merge(&["S1.tsv", "S2.tsv"], &options, &mut TracingSink)?;
//! write_merged_table(&table, "joined.tsv".as_ref(), false)?;
//! ```

mod diagnostics;
mod error;
mod merge;
mod options;
mod output;
mod summary;
mod table;

// === Error Types ===
pub use error::{MergeError, Result};

// === Configuration ===
pub use options::{DEFAULT_FILL_VALUE, MIN_TABLES, MergeOptions};

// === Diagnostics ===
pub use diagnostics::{CollectingSink, DiagnosticsSink, MergeEvent, TracingSink};

// === Merging ===
pub use merge::{TableMerger, merge};
pub use summary::{RunSummary, TableRecord};
pub use table::MergedTable;

// === Output ===
pub use output::{ensure_writable, write_merged_table};
