//! Per-sample abundance tables keyed by taxon.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::layout::{LayoutDescriptor, detect_layout};
use crate::reader::read_data_rows;

/// Identity of a row: the values of every column except the last.
///
/// Ordering is lexicographic over the parts, which is also the row order of
/// a merged table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaxonKey(Vec<String>);

impl TaxonKey {
    pub fn new(parts: Vec<String>) -> Self {
        Self(parts)
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for TaxonKey {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<Vec<String>> for TaxonKey {
    fn from(parts: Vec<String>) -> Self {
        Self(parts)
    }
}

impl fmt::Display for TaxonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// One input file reduced to `taxon key -> abundance`.
///
/// The value is `None` when the file leaves the abundance cell empty; such
/// rows still contribute their key to a merge.
#[derive(Debug, Clone)]
pub struct SampleTable {
    path: PathBuf,
    layout: LayoutDescriptor,
    rows: BTreeMap<TaxonKey, Option<f64>>,
}

impl SampleTable {
    /// Builds a table from already-parsed rows.
    ///
    /// Fails with [`IngestError::DuplicateTaxon`] on the first repeated key.
    pub fn from_rows<I>(
        path: impl Into<PathBuf>,
        layout: LayoutDescriptor,
        rows: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (TaxonKey, Option<f64>)>,
    {
        let path = path.into();
        let mut indexed = BTreeMap::new();
        for (key, value) in rows {
            if indexed.contains_key(&key) {
                return Err(IngestError::DuplicateTaxon { path, key });
            }
            indexed.insert(key, value);
        }
        Ok(Self {
            path,
            layout,
            rows: indexed,
        })
    }

    /// Builds a table from the DataFrame produced by [`read_data_rows`].
    ///
    /// Every key column must be filled; a row with an empty key column fails
    /// with [`IngestError::MissingKey`].
    pub fn from_frame(path: &Path, layout: LayoutDescriptor, df: &DataFrame) -> Result<Self> {
        let key_columns = layout
            .key_columns()
            .iter()
            .map(|name| df.column(name).and_then(|column| column.str()))
            .collect::<PolarsResult<Vec<&StringChunked>>>()?;
        let values = df.column(layout.value_column())?.f64()?;

        let mut rows = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let mut parts = Vec::with_capacity(key_columns.len());
            for (column, name) in key_columns.iter().zip(layout.key_columns()) {
                let part = column.get(idx).ok_or_else(|| IngestError::MissingKey {
                    path: path.to_path_buf(),
                    row: idx + 1,
                    column: name.clone(),
                })?;
                parts.push(part.to_string());
            }
            rows.push((TaxonKey::new(parts), values.get(idx)));
        }
        Self::from_rows(path, layout, rows)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &LayoutDescriptor {
        &self.layout
    }

    /// Name of the value column after merging.
    pub fn sample_id(&self) -> &str {
        &self.layout.sample_id
    }

    pub fn key_columns(&self) -> &[String] {
        self.layout.key_columns()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Abundance for `key`; `None` if the taxon is absent or its cell is empty.
    pub fn get(&self, key: &TaxonKey) -> Option<f64> {
        self.rows.get(key).copied().flatten()
    }

    /// Rows in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&TaxonKey, Option<f64>)> {
        self.rows.iter().map(|(key, value)| (key, *value))
    }

    /// Consumes the table, yielding its rows in key order.
    pub fn into_rows(self) -> impl Iterator<Item = (TaxonKey, Option<f64>)> {
        self.rows.into_iter()
    }
}

/// Detects the layout of `path` and loads its data rows.
pub fn read_sample_table(path: &Path) -> Result<SampleTable> {
    let layout = detect_layout(path)?;
    let df = read_data_rows(path, &layout)?;
    let table = SampleTable::from_frame(path, layout, &df)?;
    tracing::debug!(
        path = %path.display(),
        sample = %table.sample_id(),
        variant = table.layout().variant.number(),
        rows = table.row_count(),
        "loaded table"
    );
    Ok(table)
}
