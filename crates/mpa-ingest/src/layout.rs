//! Header layout detection for single-sample abundance tables.
//!
//! Different profiler releases write the same table with a different preamble.
//! The layout is recognised from the first [`PROBE_LINES`] lines only, by
//! locating the line that starts with [`ROW_KEY_MARKER`].

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::error::{IngestError, Result};
use crate::reader::read_first_lines;

/// Token that opens the sample-name line (or the header in the oldest layout).
pub const ROW_KEY_MARKER: &str = "#SampleID";

/// Database reported for layouts that carry no database line.
pub const UNKNOWN_DATABASE: &str = "#Unknown database";

/// Number of leading lines inspected during detection.
pub const PROBE_LINES: usize = 4;

/// The known header layouts.
///
/// The discriminant doubles as the number of preamble rows to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayoutVariant {
    /// Line 1 is the header and starts with the marker.
    HeaderOnly = 1,
    /// Database line, `#SampleID <sample>` line, header.
    SampleLine = 2,
    /// Database line, free-form line, `#SampleID <sample>` line, header.
    CommentedSampleLine = 3,
}

impl LayoutVariant {
    /// All variants in detection order.
    pub const ALL: [Self; 3] = [
        Self::HeaderOnly,
        Self::SampleLine,
        Self::CommentedSampleLine,
    ];

    /// Layout number as printed in diagnostics (1, 2 or 3).
    pub fn number(self) -> usize {
        self as usize
    }

    /// Number of preamble rows before the sample-name line. This is also the
    /// 1-based line holding the marker token.
    pub fn skip_rows(self) -> usize {
        self.number()
    }

    /// 1-based line holding the column headers. Data starts right after it.
    pub fn header_line(self) -> usize {
        match self {
            Self::HeaderOnly => 1,
            Self::SampleLine => 3,
            Self::CommentedSampleLine => 4,
        }
    }

    /// Whether line 1 of this layout names the reference database.
    pub fn has_database_line(self) -> bool {
        !matches!(self, Self::HeaderOnly)
    }
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "variant {}", self.number())
    }
}

/// Reasons a preamble could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// None of the known layouts match.
    #[error("no known layout matches the first four lines: {}", .lines.join(" | "))]
    Unsupported { lines: Vec<String> },

    /// The marker line has no sample name after the marker.
    #[error("line {line} has no sample name after #SampleID")]
    MissingSampleId { line: usize },

    /// The header needs at least one key column and one value column.
    #[error("header on line {line} has {found} column(s), expected at least 2")]
    TooFewColumns { line: usize, found: usize },

    /// The header names the same column twice.
    #[error("header names column '{name}' more than once")]
    DuplicateColumn { name: String },
}

/// Everything detection learns about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDescriptor {
    /// Sample identifier; becomes the value column's name after merging.
    pub sample_id: String,
    /// Reference database line, or [`UNKNOWN_DATABASE`].
    pub database: String,
    pub variant: LayoutVariant,
    /// At least two distinct names; the last one is the value column.
    columns: Vec<String>,
}

impl LayoutDescriptor {
    /// Builds a descriptor, checking that `columns` has a key and a value
    /// column and names each column once.
    pub fn new(
        sample_id: impl Into<String>,
        columns: Vec<String>,
        database: impl Into<String>,
        variant: LayoutVariant,
    ) -> std::result::Result<Self, LayoutError> {
        if columns.len() < 2 {
            return Err(LayoutError::TooFewColumns {
                line: variant.header_line(),
                found: columns.len(),
            });
        }
        if let Some(name) = first_duplicate(&columns) {
            return Err(LayoutError::DuplicateColumn {
                name: name.to_string(),
            });
        }
        Ok(Self {
            sample_id: sample_id.into(),
            database: database.into(),
            variant,
            columns,
        })
    }

    /// Column headers in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns that form the taxon key (all but the last).
    pub fn key_columns(&self) -> &[String] {
        self.columns
            .split_last()
            .map(|(_, keys)| keys)
            .unwrap_or_default()
    }

    /// Name of the abundance column as written in the file.
    pub fn value_column(&self) -> &str {
        self.columns.last().map_or("", String::as_str)
    }
}

/// Detects the layout of the table at `path`.
///
/// Reads at most [`PROBE_LINES`] lines; the rest of the file is not touched.
pub fn detect_layout(path: &Path) -> Result<LayoutDescriptor> {
    let lines = read_first_lines(path, PROBE_LINES)?;
    let layout = detect_lines(&lines).map_err(|source| IngestError::Layout {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::trace!(
        path = %path.display(),
        sample = %layout.sample_id,
        variant = layout.variant.number(),
        "detected table layout"
    );
    Ok(layout)
}

/// Detects a layout from already-read leading lines.
///
/// Missing lines are treated as empty, so short files still get a clear
/// [`LayoutError::Unsupported`].
pub fn detect_lines<S: AsRef<str>>(
    lines: &[S],
) -> std::result::Result<LayoutDescriptor, LayoutError> {
    let line = |number: usize| line_at(lines, number);

    let variant = LayoutVariant::ALL
        .into_iter()
        .find(|variant| line(variant.skip_rows()).starts_with(ROW_KEY_MARKER))
        .ok_or_else(|| LayoutError::Unsupported {
            lines: (1..=PROBE_LINES).map(|n| line(n).to_string()).collect(),
        })?;

    let sample_id = line(variant.skip_rows())
        .split_whitespace()
        .nth(1)
        .ok_or(LayoutError::MissingSampleId {
            line: variant.skip_rows(),
        })?;

    let columns: Vec<String> = line(variant.header_line())
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let database = if variant.has_database_line() {
        line(1)
    } else {
        UNKNOWN_DATABASE
    };

    LayoutDescriptor::new(sample_id, columns, database, variant)
}

fn line_at<S: AsRef<str>>(lines: &[S], number: usize) -> &str {
    lines
        .get(number - 1)
        .map_or("", |value| value.as_ref().trim())
}

fn first_duplicate(columns: &[String]) -> Option<&str> {
    columns
        .iter()
        .enumerate()
        .find(|&(idx, name)| columns[..idx].contains(name))
        .map(|(_, name)| name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_numbers() {
        assert_eq!(LayoutVariant::HeaderOnly.skip_rows(), 1);
        assert_eq!(LayoutVariant::SampleLine.skip_rows(), 2);
        assert_eq!(LayoutVariant::CommentedSampleLine.skip_rows(), 3);
        assert_eq!(LayoutVariant::CommentedSampleLine.header_line(), 4);
        assert_eq!(LayoutVariant::SampleLine.to_string(), "variant 2");
    }

    #[test]
    fn test_detect_header_only() {
        let layout = detect_lines(&["#SampleID\tS1", "k__Bacteria\t100.0"]).unwrap();

        assert_eq!(layout.variant, LayoutVariant::HeaderOnly);
        assert_eq!(layout.sample_id, "S1");
        assert_eq!(layout.columns(), ["#SampleID", "S1"]);
        assert_eq!(layout.database, UNKNOWN_DATABASE);
        assert_eq!(layout.key_columns(), ["#SampleID".to_string()]);
        assert_eq!(layout.value_column(), "S1");
    }

    #[test]
    fn test_detect_sample_line() {
        let layout = detect_lines(&[
            "#mpa_v20_m200",
            "#SampleID\tS2",
            "#clade_name\trelative_abundance",
            "k__Bacteria\t100.0",
        ])
        .unwrap();

        assert_eq!(layout.variant, LayoutVariant::SampleLine);
        assert_eq!(layout.sample_id, "S2");
        assert_eq!(layout.database, "#mpa_v20_m200");
        assert_eq!(layout.columns(), ["#clade_name", "relative_abundance"]);
    }

    #[test]
    fn test_detect_commented_sample_line() {
        let layout = detect_lines(&[
            "#mpa_v30_CHOCOPhlAn_201901",
            "#/usr/bin/metaphlan reads.fq --input_type fastq",
            "#SampleID\tS3",
            "#clade_name\tNCBI_tax_id\trelative_abundance\tadditional_species",
        ])
        .unwrap();

        assert_eq!(layout.variant, LayoutVariant::CommentedSampleLine);
        assert_eq!(layout.sample_id, "S3");
        assert_eq!(layout.database, "#mpa_v30_CHOCOPhlAn_201901");
        assert_eq!(layout.key_columns().len(), 3);
        assert_eq!(layout.value_column(), "additional_species");
    }

    #[test]
    fn test_blank_second_line() {
        let layout = detect_lines(&["#db", "", "#SampleID S4", "#clade_name abundance"]).unwrap();
        assert_eq!(layout.variant, LayoutVariant::CommentedSampleLine);
        assert_eq!(layout.sample_id, "S4");
    }

    #[test]
    fn test_unsupported_layout() {
        let err = detect_lines(&["#db", "", "", "#SampleID S1"]).unwrap_err();
        match err {
            LayoutError::Unsupported { lines } => {
                assert_eq!(lines, vec!["#db", "", "", "#SampleID S1"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_input_is_unsupported() {
        let err = detect_lines::<&str>(&[]).unwrap_err();
        assert!(matches!(err, LayoutError::Unsupported { .. }));
    }

    #[test]
    fn test_missing_sample_id() {
        let err = detect_lines(&["#db", "#SampleID", "#clade_name\tabundance"]).unwrap_err();
        assert_eq!(err, LayoutError::MissingSampleId { line: 2 });
    }

    #[test]
    fn test_header_needs_two_columns() {
        let err = detect_lines(&["#db", "#SampleID S1", "#clade_name"]).unwrap_err();
        assert_eq!(err, LayoutError::TooFewColumns { line: 3, found: 1 });
    }

    #[test]
    fn test_duplicate_header_column() {
        let err = detect_lines(&["#db", "#SampleID S1", "#clade_name\tx\tx"]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::DuplicateColumn {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn test_new_rejects_missing_value_column() {
        let columns = vec!["#SampleID".to_string()];
        let err =
            LayoutDescriptor::new("S1", columns, "db", LayoutVariant::HeaderOnly).unwrap_err();
        assert_eq!(err, LayoutError::TooFewColumns { line: 1, found: 1 });

        let err =
            LayoutDescriptor::new("S1", Vec::new(), "db", LayoutVariant::SampleLine).unwrap_err();
        assert_eq!(err, LayoutError::TooFewColumns { line: 3, found: 0 });
    }
}
