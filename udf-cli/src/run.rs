//! CLI dispatch logic for the udf binary.

use colored::Colorize;
use log::debug;
use path_abs::{PathAbs, PathInfo};
use std::fs::File;
use std::io::BufWriter;

use udf::{decode, scale, DecodeOptions};

use crate::cli::{CliOutFormat, UdfCli, UdfCliCommands};
use crate::err::CliError;

/// Reads the UDF file at `input` and decodes it per `options`.
fn read_and_decode(
    input: std::path::PathBuf,
    options: DecodeOptions,
) -> Result<udf::DecodeOutput, CliError> {
    let abs_path = PathAbs::new(input)?.as_path().to_path_buf();
    debug!("decoding UDF file {}", abs_path.to_string_lossy());
    let bytes = std::fs::read(&abs_path)?;
    Ok(decode(&bytes, options)?)
}

/// Executes the CLI command specified by the parsed [`UdfCli`] arguments.
///
/// This is the main entry point for the CLI binary, dispatching to the
/// `schema` or `decode` subcommand.
pub fn run(cli: UdfCli) -> Result<(), CliError> {
    env_logger::init();

    match cli.command {
        UdfCliCommands::Schema { input, as_json } => {
            let output = read_and_decode(input, DecodeOptions::default())?;
            if as_json {
                let fields: Vec<serde_json::Value> = output
                    .schema
                    .fields()
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "name": f.name(),
                            "data_type": format!("{:?}", f.data_type()),
                            "nullable": f.is_nullable(),
                            "metadata": f.metadata(),
                        })
                    })
                    .collect();
                let doc = serde_json::json!({
                    "version": format!("{:?}", output.version),
                    "metadata": output.schema.metadata(),
                    "fields": fields,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("version: {:?}", output.version);
                for field in output.schema.fields() {
                    println!(
                        "  {}: {:?}{}",
                        field.name(),
                        field.data_type(),
                        if field.is_nullable() { "" } else { " (non-null)" }
                    );
                }
            }
            Ok(())
        }
        UdfCliCommands::Decode {
            input,
            output,
            format,
            lenient,
            scale: apply_scaling,
        } => {
            let options = DecodeOptions {
                strict: !lenient,
                apply_scaling: false,
            };
            let decoded = read_and_decode(input, options)?;
            let mut table = udf::DecodedTable {
                schema: decoded.schema,
                batch: decoded.table,
            };
            if apply_scaling {
                table = scale(&table)?;
            }

            let Some(out_path) = output else {
                println!(
                    "{}: a value was not provided for the parameter {}, thus displaying schema only\n",
                    "Warning".bright_yellow(),
                    "--output".bright_cyan()
                );
                for field in table.schema.fields() {
                    println!("  {}: {:?}", field.name(), field.data_type());
                }
                return Ok(());
            };

            let resolved_format = format
                .or_else(|| CliOutFormat::from_extension(&out_path))
                .ok_or_else(|| CliError::UnresolvedFormat(out_path.clone()))?;

            println!(
                "Writing decoded data to file {}",
                out_path.to_string_lossy().bright_yellow()
            );

            match resolved_format {
                CliOutFormat::Csv => write_csv(&table, &out_path)?,
                CliOutFormat::Parquet => write_parquet(&table, &out_path)?,
            }

            println!("wrote {} rows to {}", table.batch.num_rows(), out_path.display());
            Ok(())
        }
    }
}

#[cfg(feature = "csv")]
fn write_csv(table: &udf::DecodedTable, out_path: &std::path::Path) -> Result<(), CliError> {
    let file = BufWriter::new(File::create(out_path)?);
    let mut writer = arrow_csv::WriterBuilder::new().with_header(true).build(file);
    writer.write(&table.batch)?;
    Ok(())
}

#[cfg(not(feature = "csv"))]
fn write_csv(_table: &udf::DecodedTable, _out_path: &std::path::Path) -> Result<(), CliError> {
    Err(CliError::FeatureNotEnabled("csv"))
}

#[cfg(feature = "parquet")]
fn write_parquet(table: &udf::DecodedTable, out_path: &std::path::Path) -> Result<(), CliError> {
    let file = File::create(out_path)?;
    let mut writer = parquet::arrow::ArrowWriter::try_new(file, table.schema.clone(), None)?;
    writer.write(&table.batch)?;
    writer.close()?;
    Ok(())
}

#[cfg(not(feature = "parquet"))]
fn write_parquet(_table: &udf::DecodedTable, _out_path: &std::path::Path) -> Result<(), CliError> {
    Err(CliError::FeatureNotEnabled("parquet"))
}
