//! CLI argument definitions for the table joiner.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use mpa_merge::DEFAULT_FILL_VALUE;

/// Output path used when `--outfile` is not given.
pub const DEFAULT_OUTFILE: &str = "joined_metaphlan2_tables.tsv";

#[derive(Parser)]
#[command(
    name = "join-mpa-tables",
    version,
    about = "Join MetaPhlAn tables",
    long_about = "Join single-sample MetaPhlAn tables into one multi-sample table.\n\n\
                  Rows are aligned on the taxon columns and each input becomes one\n\
                  sample column. Taxa missing from a sample are filled with --fillna."
)]
pub struct Cli {
    /// MetaPhlAn TSV table(s) to join.
    #[arg(value_name = "TABLES", required = true)]
    pub tables: Vec<PathBuf>,

    /// Outfile name.
    #[arg(short = 'o', long = "outfile", value_name = "PATH", default_value = DEFAULT_OUTFILE)]
    pub outfile: PathBuf,

    /// Overwrite output file if it already exists.
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Fill NA values in merged table with FLOAT.
    #[arg(
        short = 'n',
        long = "fillna",
        value_name = "FLOAT",
        default_value_t = DEFAULT_FILL_VALUE,
        allow_negative_numbers = true
    )]
    pub fillna: f64,

    /// Do not print the per-table summary after writing.
    #[arg(long = "no-summary")]
    pub no_summary: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(short = 'l', long = "loglevel", value_enum, ignore_case = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
