//! Abundance table ingestion.
//!
//! This crate turns one single-sample taxonomic profile (a MetaPhlAn-style
//! TSV file) into an in-memory [`SampleTable`].
//!
//! # Features
//!
//! - **Layout Detection**: Recognise the three known header layouts from the
//!   first four lines of a file
//! - **Data Loading**: Read the data rows into a Polars DataFrame using the
//!   detected column headers
//! - **Sample Tables**: Index each row by its taxon key and keep a single
//!   abundance column named after the sample
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use mpa_ingest::{detect_layout, read_sample_table};
//!
//! let layout = detect_layout(Path::new("profiles/S1.tsv"))?;
//! println!("{} uses {}", layout.sample_id, layout.variant);
//!
//! let table = read_sample_table(Path::new("profiles/S1.tsv"))?;
//! println!("{} taxa", table.row_count());
//! ```

mod error;
mod layout;
mod reader;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === Layout Detection ===
pub use layout::{
    LayoutDescriptor, LayoutError, LayoutVariant, PROBE_LINES, ROW_KEY_MARKER, UNKNOWN_DATABASE,
    detect_layout, detect_lines,
};

// === Data Loading ===
pub use reader::{read_data_rows, read_first_lines};

// === Sample Tables ===
pub use table::{SampleTable, TaxonKey, read_sample_table};
