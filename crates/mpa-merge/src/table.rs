//! The wide, multi-sample result table.

use std::collections::BTreeMap;

use mpa_ingest::{SampleTable, TaxonKey};
use polars::prelude::*;

/// Union of all taxon keys by all samples.
///
/// Rows are kept in key order. A cell is `None` until [`fill_missing`]
/// replaces it, either because the sample lacks the taxon or because its
/// source cell was empty.
///
/// [`fill_missing`]: MergedTable::fill_missing
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    key_columns: Vec<String>,
    samples: Vec<String>,
    rows: BTreeMap<TaxonKey, Vec<Option<f64>>>,
}

impl MergedTable {
    /// Starts an empty table with the given key column names.
    pub fn new(key_columns: Vec<String>) -> Self {
        Self {
            key_columns,
            samples: Vec::new(),
            rows: BTreeMap::new(),
        }
    }

    /// Outer-joins `table` as a new rightmost sample column.
    ///
    /// Existing rows the table lacks get a missing cell; keys only the table
    /// has become new rows, missing in every earlier sample.
    pub fn join_outer(&mut self, table: SampleTable) {
        let width = self.samples.len();
        self.samples.push(table.sample_id().to_string());
        for cells in self.rows.values_mut() {
            cells.push(None);
        }
        for (key, value) in table.into_rows() {
            let cells = self.rows.entry(key).or_insert_with(|| vec![None; width + 1]);
            cells[width] = value;
        }
    }

    /// Replaces every missing cell with `fill`. Returns how many were filled.
    pub fn fill_missing(&mut self, fill: f64) -> usize {
        let mut filled = 0;
        for cell in self.rows.values_mut().flatten() {
            if cell.is_none() {
                *cell = Some(fill);
                filled += 1;
            }
        }
        filled
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Sample identifiers in input order.
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TaxonKey> {
        self.rows.keys()
    }

    /// Cell for (`key`, `sample`); `None` if either is unknown or the cell is missing.
    pub fn value(&self, key: &TaxonKey, sample: &str) -> Option<f64> {
        let column = self.samples.iter().position(|s| s == sample)?;
        self.row(key)?.get(column).copied().flatten()
    }

    /// Row cells in sample order.
    pub fn row(&self, key: &TaxonKey) -> Option<&[Option<f64>]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    /// Converts to a DataFrame: key columns as strings, one `Float64`
    /// column per sample. Missing cells become nulls.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.key_columns.len() + self.samples.len());

        for (idx, name) in self.key_columns.iter().enumerate() {
            let values: Vec<&str> = self
                .rows
                .keys()
                .map(|key| key.parts().get(idx).map_or("", String::as_str))
                .collect();
            columns.push(Series::new(name.as_str().into(), values).into_column());
        }

        for (idx, sample) in self.samples.iter().enumerate() {
            let values: Vec<Option<f64>> = self.rows.values().map(|cells| cells[idx]).collect();
            columns.push(Series::new(sample.as_str().into(), values).into_column());
        }

        DataFrame::new(columns)
    }
}
