//! Raw file access: preamble lines and the tab-separated data section.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::layout::LayoutDescriptor;

/// Field separator of the data section.
const SEPARATOR: u8 = b'\t';

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Reads the first `n` lines from a file.
///
/// Returns fewer lines when the file is shorter. A UTF-8 BOM on the first
/// line is dropped.
pub fn read_first_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    let reader = BufReader::new(open_file(path)?);
    let mut lines = Vec::with_capacity(n);

    for line_result in reader.lines().take(n) {
        let line = line_result.map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let cleaned = line.strip_prefix('\u{feff}').unwrap_or(&line).to_string();
        lines.push(cleaned);
    }

    Ok(lines)
}

/// Builds a schema over `layout`'s columns: keys as strings, the value
/// column as `value_dtype`.
fn data_schema(layout: &LayoutDescriptor, value_dtype: DataType) -> Schema {
    let value_index = layout.key_columns().len();
    layout
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let dtype = if idx == value_index {
                value_dtype.clone()
            } else {
                DataType::String
            };
            (PlSmallStr::from(name.as_str()), dtype)
        })
        .collect()
}

/// Whether any non-blank line follows the first `header_line` lines.
fn has_data_lines(path: &Path, header_line: usize) -> Result<bool> {
    let reader = BufReader::new(open_file(path)?);
    for line_result in reader.lines().skip(header_line) {
        let line = line_result.map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        if !line.trim().is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Drops rows in which every field is empty (blank lines in the data section).
fn drop_blank_rows(df: &DataFrame) -> Result<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(Column::str)
        .collect::<PolarsResult<Vec<_>>>()?;
    let keep: Vec<bool> = (0..df.height())
        .map(|idx| {
            columns
                .iter()
                .any(|column| column.get(idx).is_some_and(|value| !value.trim().is_empty()))
        })
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

/// Converts the value column to `Float64`, naming the first offending value
/// when the column is not numeric.
fn parse_values(path: &Path, layout: &LayoutDescriptor, mut df: DataFrame) -> Result<DataFrame> {
    let name = layout.value_column();
    let raw = df.column(name)?.as_materialized_series().clone();
    let values = raw
        .strict_cast(&DataType::Float64)
        .map_err(|e| IngestError::NonNumericValue {
            path: path.to_path_buf(),
            column: name.to_string(),
            value: first_non_numeric(&raw).unwrap_or_else(|| e.to_string()),
        })?;
    df.with_column(values)?;
    Ok(df)
}

fn first_non_numeric(raw: &Series) -> Option<String> {
    raw.str()
        .ok()?
        .into_iter()
        .flatten()
        .find(|value| value.trim().parse::<f64>().is_err())
        .map(str::to_string)
}

/// Reads the data section of a table into a DataFrame.
///
/// Everything up to and including the header line of `layout.variant` is
/// skipped; the columns are named from the layout. Blank lines are dropped
/// and rows with missing trailing fields yield nulls. Key columns come back
/// as `String`, the value column as `Float64`.
pub fn read_data_rows(path: &Path, layout: &LayoutDescriptor) -> Result<DataFrame> {
    let header_line = layout.variant.header_line();

    if !has_data_lines(path, header_line)? {
        tracing::debug!(path = %path.display(), "table has no data rows");
        return Ok(DataFrame::empty_with_schema(&data_schema(
            layout,
            DataType::Float64,
        )));
    }

    let raw = CsvReadOptions::default()
        .with_has_header(false)
        .with_skip_rows(header_line)
        .with_schema(Some(Arc::new(data_schema(layout, DataType::String))))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(SEPARATOR)
                .with_quote_char(None)
                .with_truncate_ragged_lines(true),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let rows = drop_blank_rows(&raw)?;
    parse_values(path, layout, rows)
}
