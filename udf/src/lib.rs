//! Decode the UDF binary sensor-log format into Arrow tables.
//!
//! A UDF file is a mixed text/binary stream produced by embedded data
//! loggers: a textual schema header followed by a tagged binary body. A
//! single recording holds heterogeneous sensors sampled at independent
//! rates, each emitting multi-axis samples interleaved with monotonically
//! increasing timestamps and occasional label markers.
//!
//! # Data pipeline
//!
//! ```text
//! UDF byte blob
//!     → header parser (text schema → per-tag SensorSchema)
//!         → body parser (tagged binary records → timestamps, labels, per-axis samples)
//!             → table builder (sparse samples → dense Arrow RecordBatch)
//!                 → optional scaling pass (raw units → physical units)
//! ```
//!
//! # Quick start
//!
//! ```
//! use udf::{decode, DecodeOptions};
//!
//! let mut blob = b"1.0\r\n1:temp:2:s16:x:0.1\r\n\r\n".to_vec();
//! blob.push(0xF0);
//! blob.extend_from_slice(&0u64.to_le_bytes());
//! blob.push(1);
//! blob.extend_from_slice(&10000i16.to_le_bytes());
//!
//! let output = decode(&blob, DecodeOptions::default()).unwrap();
//! assert_eq!(output.table.num_rows(), 1);
//! ```
//!
//! # Key types
//!
//! - [`schema::SensorSchema`] / [`schema::AxisSchema`] — per-sensor, per-axis header metadata
//! - [`body::BodyResult`] — the sparse timestamp/label/sample streams produced by the body parser
//! - [`table::DecodedTable`] — the dense Arrow schema + record batch produced by [`decode`]
//! - [`err::UdfError`] — the single error type returned by every fallible operation
//!
//! This crate only ever reads a fully-buffered byte blob; streaming/partial
//! decoding and schema versions beyond `1.0`/`1.1` are out of scope.
//! Persisting the decoded table (Parquet, CSV, ...) is left to external
//! collaborators — see the `udf-cli` binary for two thin examples.

#![warn(missing_docs)]

use std::sync::Arc;

pub mod body;
pub mod err;
pub mod scale;
pub mod schema;
pub mod table;
pub mod types;
pub mod value;

pub use body::{BodyResult, SampleStore};
pub use err::UdfError;
pub use scale::scale;
pub use schema::{AxisSchema, ParsedHeader, SensorSchema, UdfVersion};
pub use table::DecodedTable;
pub use types::UdfType;
pub use value::UdfValue;

/// Options controlling a single [`decode`] call.
#[derive(Clone, Copy, Debug)]
pub struct DecodeOptions {
    /// When `true` (the default), a truncated record propagates
    /// [`UdfError::TruncatedEvent`] immediately. When `false`, the same
    /// condition stops body parsing and returns everything decoded up to
    /// that point as a successful result.
    pub strict: bool,
    /// When `true`, the output table has already had [`scale`] applied.
    /// Defaults to `false` — the raw, unscaled table.
    pub apply_scaling: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict: true,
            apply_scaling: false,
        }
    }
}

/// The result of a successful [`decode`] call.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    /// The header's declared format version.
    pub version: UdfVersion,
    /// The decoded table's Arrow schema.
    pub schema: Arc<arrow_schema::Schema>,
    /// The decoded table's record batch.
    pub table: arrow_array::RecordBatch,
}

/// Decodes a complete UDF byte blob into a schema and a dense table.
///
/// Runs the header parser, then the body parser, then the table builder, in
/// that order; if `options.apply_scaling` is set, the scaling pass runs
/// last. Every stage's error propagates unchanged — nothing is caught or
/// retried inside the core.
pub fn decode(blob: &[u8], options: DecodeOptions) -> Result<DecodeOutput, UdfError> {
    let header = schema::parse_header(blob)?;
    log::debug!(
        "header parsed: version={:?}, {} sensors",
        header.version,
        header.sensors.len()
    );

    let body = body::parse_body(blob, header.body_start, &header.sensors, options.strict)?;

    let mut decoded = table::build_table(&header.sensors, &body)?;
    if options.apply_scaling {
        decoded = scale::scale(&decoded)?;
    }

    Ok(DecodeOutput {
        version: header.version,
        schema: decoded.schema,
        table: decoded.batch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::Array;

    fn header_and_event(header: &str, event: &[u8]) -> Vec<u8> {
        let mut blob = header.as_bytes().to_vec();
        blob.extend_from_slice(event);
        blob
    }

    #[test]
    fn s1_single_v1_0_sensor_one_event() {
        let mut event = vec![0xF0u8];
        event.extend_from_slice(&0u64.to_le_bytes());
        event.push(1);
        event.extend_from_slice(&10000i16.to_le_bytes());
        let blob = header_and_event("1.0\r\n1:temp:2:s16:x:0.1\r\n\r\n", &event);

        let output = decode(&blob, DecodeOptions::default()).unwrap();
        assert_eq!(output.version, UdfVersion::V1_0);
        assert_eq!(output.table.num_rows(), 1);

        let time = output
            .table
            .column(0)
            .as_any()
            .downcast_ref::<arrow_array::UInt64Array>()
            .unwrap();
        assert_eq!(time.value(0), 0);

        let labels = output
            .table
            .column(1)
            .as_any()
            .downcast_ref::<arrow_array::StringArray>()
            .unwrap();
        assert!(labels.is_null(0));

        let temp_x = output
            .table
            .column(2)
            .as_any()
            .downcast_ref::<arrow_array::Int16Array>()
            .unwrap();
        assert_eq!(temp_x.value(0), 10000);

        let scaled = scale(&DecodedTable {
            schema: output.schema,
            batch: output.table,
        })
        .unwrap();
        let scaled_x = scaled
            .batch
            .column(2)
            .as_any()
            .downcast_ref::<arrow_array::Float64Array>()
            .unwrap();
        assert_eq!(scaled_x.value(0), 1000.0);
    }

    #[test]
    fn s2_v1_1_two_axis_sensor() {
        let mut blob = b"1.1\r\n2:accel:8:s32,s32:x,y:1.0:1000.0:na\r\n\r\n".to_vec();
        blob.extend_from_slice(&[0u8; 6]);
        blob.push(0xF1);
        blob.extend_from_slice(&1_000_000_000u64.to_le_bytes());
        blob.push(2);
        blob.extend_from_slice(&1i32.to_le_bytes());
        blob.extend_from_slice(&(-1i32).to_le_bytes());

        let output = decode(&blob, DecodeOptions::default()).unwrap();
        assert_eq!(output.version, UdfVersion::V1_1);
        assert_eq!(output.table.num_rows(), 1);

        let time = output
            .table
            .column(0)
            .as_any()
            .downcast_ref::<arrow_array::UInt64Array>()
            .unwrap();
        assert_eq!(time.value(0), 1_000_000_000);

        let x = output
            .table
            .column(2)
            .as_any()
            .downcast_ref::<arrow_array::Int32Array>()
            .unwrap();
        assert_eq!(x.value(0), 1);
        let y = output
            .table
            .column(3)
            .as_any()
            .downcast_ref::<arrow_array::Int32Array>()
            .unwrap();
        assert_eq!(y.value(0), -1);
    }

    #[test]
    fn s6_truncated_event_strict_errors() {
        let mut blob = b"1.0\r\n1:a:4:s32:x:1.0\r\n\r\n".to_vec();
        blob.push(1);
        blob.extend_from_slice(&[0u8, 1u8]); // only 2 of 4 bytes
        assert!(matches!(
            decode(&blob, DecodeOptions::default()),
            Err(UdfError::TruncatedEvent { .. })
        ));
    }
}
