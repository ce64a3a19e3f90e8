//! Structured diagnostics emitted while merging.
//!
//! The merger never logs directly; it hands [`MergeEvent`]s to a
//! [`DiagnosticsSink`] supplied by the caller.

use std::collections::BTreeMap;
use std::path::PathBuf;

use mpa_ingest::LayoutVariant;
use tracing::{debug, warn};

/// Something worth reporting about a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    /// One input table was loaded.
    TableLoaded {
        path: PathBuf,
        sample_id: String,
        variant: LayoutVariant,
        rows: usize,
    },
    /// All input tables were loaded.
    TablesLoaded { count: usize },
    /// Histogram of table sizes: row count -> number of tables.
    TableSizes { sizes: BTreeMap<usize, usize> },
    /// Inputs used more than one header layout.
    VariantMismatch {
        variants: BTreeMap<LayoutVariant, Vec<PathBuf>>,
    },
    /// Inputs declared more than one reference database.
    DatabaseMismatch { databases: Vec<String> },
    /// Every input declared the same database.
    SharedDatabase { database: String },
    /// A table names its key columns differently from the first table.
    KeyColumnsDiffer {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// Rows in the merged table.
    OutputRows { rows: usize },
}

impl MergeEvent {
    /// Whether the event reports an inconsistency between inputs.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::VariantMismatch { .. }
                | Self::DatabaseMismatch { .. }
                | Self::KeyColumnsDiffer { .. }
        )
    }
}

/// Receiver for merge diagnostics.
pub trait DiagnosticsSink {
    fn record(&mut self, event: MergeEvent);
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for &mut S {
    fn record(&mut self, event: MergeEvent) {
        (**self).record(event);
    }
}

/// Forwards events to `tracing`: inconsistencies at `warn`, the rest at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&mut self, event: MergeEvent) {
        match event {
            MergeEvent::TableLoaded {
                path,
                sample_id,
                variant,
                rows,
            } => debug!(
                path = %path.display(),
                sample = %sample_id,
                variant = variant.number(),
                rows,
                "loaded table"
            ),
            MergeEvent::TablesLoaded { count } => debug!("Loaded {count} tables to join."),
            MergeEvent::TableSizes { sizes } => debug!("Observed table sizes: {sizes:?}."),
            MergeEvent::VariantMismatch { variants } => warn!(
                "More than one table variant observed: {}.",
                format_variants(&variants)
            ),
            MergeEvent::DatabaseMismatch { databases } => warn!(
                "Joined tables appear to have used different databases: {databases:?}"
            ),
            MergeEvent::SharedDatabase { database } => {
                debug!("All tables used the same db: {database}");
            }
            MergeEvent::KeyColumnsDiffer {
                path,
                expected,
                found,
            } => warn!(
                path = %path.display(),
                "Key columns {found:?} differ from the first table's {expected:?}; keeping the first."
            ),
            MergeEvent::OutputRows { rows } => debug!("Output table has {rows} rows."),
        }
    }
}

fn format_variants(variants: &BTreeMap<LayoutVariant, Vec<PathBuf>>) -> String {
    let entries: Vec<String> = variants
        .iter()
        .map(|(variant, paths)| {
            let files: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            format!("{}: [{}]", variant.number(), files.join(", "))
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub events: Vec<MergeEvent>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &MergeEvent> {
        self.events.iter().filter(|event| event.is_warning())
    }
}

impl DiagnosticsSink for CollectingSink {
    fn record(&mut self, event: MergeEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_variants() {
        let mut variants = BTreeMap::new();
        variants.insert(LayoutVariant::HeaderOnly, vec![PathBuf::from("a.tsv")]);
        variants.insert(
            LayoutVariant::SampleLine,
            vec![PathBuf::from("b.tsv"), PathBuf::from("c.tsv")],
        );
        assert_eq!(
            format_variants(&variants),
            "{1: [a.tsv], 2: [b.tsv, c.tsv]}"
        );
    }

    #[test]
    fn test_collecting_sink_filters_warnings() {
        let mut sink = CollectingSink::new();
        sink.record(MergeEvent::TablesLoaded { count: 2 });
        sink.record(MergeEvent::DatabaseMismatch {
            databases: vec!["a".to_string(), "b".to_string()],
        });

        assert_eq!(sink.events.len(), 2);
        assert_eq!(sink.warnings().count(), 1);
    }
}
