//! Per-run bookkeeping used for consistency warnings.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use mpa_ingest::{LayoutVariant, SampleTable};

use crate::diagnostics::{DiagnosticsSink, MergeEvent};

/// What was learned about one input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    pub path: PathBuf,
    pub sample_id: String,
    pub variant: LayoutVariant,
    pub database: String,
    pub rows: usize,
}

/// Observed layouts, databases and sizes across all inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One record per input, in input order.
    pub tables: Vec<TableRecord>,
    /// Files grouped by layout.
    pub variants: BTreeMap<LayoutVariant, Vec<PathBuf>>,
    /// Row count -> number of tables with that many rows.
    pub table_sizes: BTreeMap<usize, usize>,
    /// Declared database of every input, in input order.
    pub databases: Vec<String>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one loaded table.
    pub fn observe(&mut self, table: &SampleTable) -> &TableRecord {
        let layout = table.layout();
        let path = table.path().to_path_buf();
        self.variants
            .entry(layout.variant)
            .or_default()
            .push(path.clone());
        *self.table_sizes.entry(table.row_count()).or_insert(0) += 1;
        self.databases.push(layout.database.clone());
        self.tables.push(TableRecord {
            path,
            sample_id: layout.sample_id.clone(),
            variant: layout.variant,
            database: layout.database.clone(),
            rows: table.row_count(),
        });
        &self.tables[self.tables.len() - 1]
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// True when inputs used more than one header layout.
    pub fn has_mixed_variants(&self) -> bool {
        self.variants.len() > 1
    }

    pub fn distinct_databases(&self) -> BTreeSet<&str> {
        self.databases.iter().map(String::as_str).collect()
    }

    /// The database every input declared, if they all agree.
    pub fn shared_database(&self) -> Option<&str> {
        let distinct = self.distinct_databases();
        if distinct.len() == 1 {
            distinct.into_iter().next()
        } else {
            None
        }
    }

    /// Reports counts, sizes and consistency findings to `sink`.
    pub fn report(&self, sink: &mut dyn DiagnosticsSink) {
        sink.record(MergeEvent::TablesLoaded {
            count: self.table_count(),
        });
        sink.record(MergeEvent::TableSizes {
            sizes: self.table_sizes.clone(),
        });
        if self.has_mixed_variants() {
            sink.record(MergeEvent::VariantMismatch {
                variants: self.variants.clone(),
            });
        }
        match self.shared_database() {
            Some(database) => sink.record(MergeEvent::SharedDatabase {
                database: database.to_string(),
            }),
            None if !self.databases.is_empty() => sink.record(MergeEvent::DatabaseMismatch {
                databases: self.databases.clone(),
            }),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use mpa_ingest::{TaxonKey, detect_lines};

    fn table(path: &str, lines: &[&str], rows: usize) -> SampleTable {
        let layout = detect_lines(lines).unwrap();
        let rows = (0..rows).map(|idx| (TaxonKey::from(format!("t{idx}").as_str()), Some(1.0)));
        SampleTable::from_rows(path, layout, rows).unwrap()
    }

    #[test]
    fn test_observe_builds_histograms() {
        let mut summary = RunSummary::new();
        summary.observe(&table("a.tsv", &["#SampleID\tA"], 2));
        summary.observe(&table("b.tsv", &["#SampleID\tB"], 2));
        summary.observe(&table("c.tsv", &["#SampleID\tC"], 5));

        assert_eq!(summary.table_count(), 3);
        assert_eq!(summary.table_sizes.get(&2), Some(&2));
        assert_eq!(summary.table_sizes.get(&5), Some(&1));
        assert!(!summary.has_mixed_variants());
        assert_eq!(summary.tables[2].sample_id, "C");
    }

    #[test]
    fn test_shared_database_is_reported_without_warning() {
        let mut summary = RunSummary::new();
        summary.observe(&table("a.tsv", &["#db1", "#SampleID A", "#clade v"], 1));
        summary.observe(&table("b.tsv", &["#db1", "#SampleID B", "#clade v"], 1));

        let mut sink = CollectingSink::new();
        summary.report(&mut sink);

        assert_eq!(summary.shared_database(), Some("#db1"));
        assert_eq!(sink.warnings().count(), 0);
        assert!(sink.events.contains(&MergeEvent::SharedDatabase {
            database: "#db1".to_string()
        }));
    }

    #[test]
    fn test_mixed_inputs_are_warned() {
        let mut summary = RunSummary::new();
        summary.observe(&table("a.tsv", &["#SampleID\tA"], 1));
        summary.observe(&table("b.tsv", &["#db2", "#SampleID B", "#clade v"], 1));

        let mut sink = CollectingSink::new();
        summary.report(&mut sink);

        assert!(summary.has_mixed_variants());
        assert_eq!(summary.shared_database(), None);
        assert_eq!(sink.warnings().count(), 2);
    }
}
