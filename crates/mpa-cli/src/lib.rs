//! CLI library components for the MetaPhlAn table joiner.

pub mod join;
pub mod logging;
