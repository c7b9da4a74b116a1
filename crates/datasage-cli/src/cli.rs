//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// DataSage: clean, validate and scan tabular data for anomalies
#[derive(Parser)]
#[command(name = "datasage")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline and write the cleaned table and a JSON report
    Run {
        /// Path to the data file (CSV, TSV or spreadsheet)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Directory for cleaned.csv and report.json
        #[arg(short, long, value_name = "DIR", default_value = "outputs")]
        outdir: PathBuf,

        /// Pipeline configuration (YAML or JSON); defaults apply when omitted
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show inferred column types and missing counts
    Inspect {
        /// Path to the data file (CSV, TSV or spreadsheet)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
