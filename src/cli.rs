//! CLI argument parsing for callsweep

use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Accepted format for `--now`
pub const NOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Output format for the finished report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// CSV file `missed_calls_<date>.csv` in the output directory (default)
    Csv,
    /// JSON document on stdout
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "callsweep")]
#[command(version)]
#[command(about = "Hourly missed-call report from a captured call list", long_about = None)]
pub struct Cli {
    /// Captured call list to replay (JSON frames)
    #[arg(value_name = "CAPTURE")]
    pub capture: PathBuf,

    /// Collector configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the CSV report is written to
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Output format (csv or json)
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Resolve "today"/"yesterday" against this local time instead of the clock
    #[arg(long = "now", value_name = "YYYY-MM-DDTHH:MM:SS", value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,

    /// Honour the configured settle/load delays between rounds
    #[arg(long = "paced")]
    pub paced: bool,

    /// Order report rows by time instead of by rendered datetime text
    #[arg(long = "chronological")]
    pub chronological: bool,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

fn parse_now(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, NOW_FORMAT)
        .map_err(|e| format!("expected {NOW_FORMAT}: {e}"))
}
