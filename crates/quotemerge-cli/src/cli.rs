//! CLI argument definitions for quotemerge.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `normalize` | Convert one provider's raw payloads into quote records |
//! | `merge` | Merge per-source record files into one record per code |
//! | `stats` | Report input statistics for a set of record files |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--config` | `$QUOTEMERGE_CONFIG` | Merge weight configuration file |
//!
//! # Examples
//!
//! ```bash
//! quotemerge normalize --source eastmoney raw_eastmoney.json > eastmoney.json
//! quotemerge normalize --source tencent raw_tencent.json > tencent.json
//! quotemerge merge tencent.json eastmoney.json --pretty
//! quotemerge stats tencent.json eastmoney.json --format table
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Normalize and merge A-share quotes from several providers.
#[derive(Debug, Parser)]
#[command(name = "quotemerge", author, version, about)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Merge weight configuration (JSON).
    ///
    /// Falls back to the QUOTEMERGE_CONFIG environment variable.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize a JSON array of raw provider objects.
    ///
    ///   quotemerge normalize --source eastmoney raw.json
    Normalize(NormalizeArgs),

    /// Merge record files, one file per source group.
    ///
    ///   quotemerge merge tencent.json eastmoney.json
    Merge(MergeArgs),

    /// Input statistics for record files.
    ///
    ///   quotemerge stats tencent.json eastmoney.json
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Provider tag (tencent, eastmoney, sina, akshare, baostock, joinquant, tushare).
    #[arg(long)]
    pub source: String,

    /// File holding a JSON array of raw objects.
    pub input: PathBuf,

    /// Keep records that fail the validity check (price <= 0).
    #[arg(long, default_value_t = false)]
    pub keep_invalid: bool,
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Record files: a JSON array of quote records or `normalize` output.
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Skip backfilling winners from losing candidates.
    #[arg(long, default_value_t = false)]
    pub no_enrich: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Record files: a JSON array of quote records or `normalize` output.
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
}
