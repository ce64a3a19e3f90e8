//! Configuration options for merging.

/// Value written for taxa a sample does not report.
pub const DEFAULT_FILL_VALUE: f64 = 0.0;

/// Smallest number of input tables a merge accepts.
pub const MIN_TABLES: usize = 2;

/// Options controlling a merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOptions {
    /// Scalar substituted for every missing (taxon, sample) cell.
    pub fill_value: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            fill_value: DEFAULT_FILL_VALUE,
        }
    }
}

impl MergeOptions {
    #[must_use]
    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = fill_value;
        self
    }
}
