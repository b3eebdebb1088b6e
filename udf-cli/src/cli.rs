//! CLI argument types for the udf binary.

use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::fmt;
use std::path::PathBuf;

/// Command-line tool for decoding UDF sensor-log files
#[derive(Parser, Debug)]
#[command(version)]
#[command(propagate_version = true)]
pub struct UdfCli {
    #[command(subcommand)]
    pub command: UdfCliCommands,
}

/// CLI subcommands for udf.
#[derive(Debug, Subcommand)]
pub enum UdfCliCommands {
    /// Display the Arrow schema a UDF file decodes to, without writing data
    Schema {
        /// Path to the UDF file
        #[arg(value_hint = ValueHint::FilePath, value_parser)]
        input: PathBuf,
        /// Display the schema as JSON
        #[arg(action, long)]
        as_json: bool,
    },
    /// Decode UDF sensor data to csv or parquet
    Decode {
        /// Path to the UDF file
        #[arg(value_hint = ValueHint::FilePath, value_parser)]
        input: PathBuf,
        /// Output file path
        #[arg(long, short = 'o', value_hint = ValueHint::FilePath, value_parser)]
        output: Option<PathBuf>,
        /// Output file format{n}Inferred from --output's extension if omitted
        #[arg(ignore_case = true, long, short = 'f', value_enum, value_parser)]
        format: Option<CliOutFormat>,
        /// Tolerate truncated trailing records instead of erroring
        #[arg(action, long)]
        lenient: bool,
        /// Apply each column's scaling factor before writing
        #[arg(action, long)]
        scale: bool,
    },
}

/// CLI output file format (with clap `ValueEnum` derive).
///
/// Clap's `ValueEnum` derive converts `PascalCase` variants to lowercase
/// for CLI input (e.g., `Csv` → `csv`).
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliOutFormat {
    /// Comma-separated values.
    Csv,
    /// Apache Parquet columnar format.
    Parquet,
}

impl fmt::Display for CliOutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Parquet => f.write_str("parquet"),
        }
    }
}

impl CliOutFormat {
    /// Infers a format from an output path's extension, e.g. `out.parquet`.
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Some(Self::Csv),
            Some("parquet") => Some(Self::Parquet),
            _ => None,
        }
    }
}
