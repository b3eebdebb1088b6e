//! Error type for the udf-cli binary.
//!
//! Everything the core decoder can fail on is [`udf::UdfError`] and is
//! wrapped here via `#[from]`. The variants declared directly on
//! [`CliError`] are the wrapper's own concerns: a bad input path, an
//! unresolved output format, or I/O raised by a writer.

use std::path::PathBuf;

/// The error type for the udf-cli binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The input path does not exist or could not be canonicalized.
    #[error("invalid path: {0}")]
    PathAbs(#[from] path_abs::Error),

    /// `--output` was given without a `--format`, and the format couldn't be
    /// inferred from the output path's extension.
    #[error("could not determine an output format for {0:?}; pass --format explicitly")]
    UnresolvedFormat(PathBuf),

    /// A `--format` was requested whose writer feature was not compiled in.
    #[error("output format {0:?} requires the udf-cli '{0}' feature, which is not enabled")]
    FeatureNotEnabled(&'static str),

    /// Decoding the input file failed.
    #[error(transparent)]
    Decode(#[from] udf::UdfError),

    /// Writing a CSV file failed.
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] arrow_schema::ArrowError),

    /// Reading the input file or writing the output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the schema to JSON failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing a Parquet file failed.
    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
