//! Sparse-to-dense reshaping: turns per-axis sample stores into a dense,
//! time-aligned Arrow [`RecordBatch`].
//!
//! Columns are built directly as `Vec<Option<T>>` and handed to the matching
//! Arrow array constructor, rather than through an intermediate
//! list-of-lists matrix (spec §9) — each column walks its own
//! `ts_indices` once and is independent of every other column.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arrow_array::{
    ArrayRef, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array, Int8Array,
    RecordBatch, StringArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow_schema::{DataType, Field, Schema};
use log::debug;

use crate::body::{BodyResult, SampleStore};
use crate::err::UdfError;
use crate::schema::SensorSchema;
use crate::types::UdfType;
use crate::value::UdfValue;

/// Name of the time column (spec §3: column 0).
pub const TIME_COLUMN_NAME: &str = "Time in ns";
/// Name of the labels column (spec §3: column 1).
pub const LABELS_COLUMN_NAME: &str = "Labels";
/// Metadata key recording whether [`crate::scale::scale`] has been applied.
pub const WAS_SCALED_KEY: &str = "Was Scaled";
/// Metadata key recording a column's scaling factor.
pub const SCALING_FACTOR_KEY: &str = "scaling_factor";

/// A fully materialised UDF table: an Arrow schema paired with its batch.
///
/// This is the `Table` of spec §3 — dense, columnar, one row per timestamp
/// event, nullable everywhere except the time column.
#[derive(Clone, Debug)]
pub struct DecodedTable {
    /// The table's Arrow schema, including per-column `scaling_factor`
    /// metadata and table-level `"Was Scaled"` metadata.
    pub schema: Arc<Schema>,
    /// The table's single record batch.
    pub batch: RecordBatch,
}

impl DecodedTable {
    /// Merges additional key/value pairs into the table's schema metadata,
    /// alongside `"Was Scaled"`, without touching any decoded value.
    ///
    /// Carried forward from the original UDF decoder's
    /// `add_user_meta_data`, which lets a caller stamp a table with
    /// recording-level context (session id, device id, ...) the UDF format
    /// itself has no room for.
    pub fn with_extra_metadata(self, extra: HashMap<String, String>) -> Self {
        let mut metadata = self.schema.metadata().clone();
        metadata.extend(extra);
        let schema = Arc::new(Schema::new(self.schema.fields().clone()).with_metadata(metadata));
        let batch = RecordBatch::try_new(schema.clone(), self.batch.columns().to_vec())
            .expect("schema field list is unchanged, only metadata differs");
        Self { schema, batch }
    }
}

/// Builds a dense [`DecodedTable`] from the sensor schemas and the body
/// parser's output.
///
/// Column order is deterministic: time, labels, then one column per
/// `(sensor, axis)` pair in ascending tag order and declared axis order
/// (spec §5). Sensors absent from `body.samples` (pruned because they
/// contributed no values) contribute no columns.
pub fn build_table(
    sensors: &BTreeMap<u8, SensorSchema>,
    body: &BodyResult,
) -> Result<DecodedTable, UdfError> {
    let num_rows = body.timestamps.len();

    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();

    fields.push(
        Field::new(TIME_COLUMN_NAME, DataType::UInt64, false)
            .with_metadata(scaling_metadata("1.0")),
    );
    arrays.push(Arc::new(UInt64Array::from(body.timestamps.clone())) as ArrayRef);

    fields.push(
        Field::new(LABELS_COLUMN_NAME, DataType::Utf8, true).with_metadata(scaling_metadata("1.0")),
    );
    arrays.push(Arc::new(StringArray::from(body.labels.clone())) as ArrayRef);

    for (tag, sensor) in sensors.iter() {
        let Some(axis_stores) = body.samples.get(tag) else {
            continue;
        };
        for (axis, store) in sensor.axes.iter().zip(axis_stores.iter()) {
            let column_name = format!("{}.{}", sensor.name, axis.name);
            let array = scatter_column(axis.udf_type, num_rows, store);
            fields.push(
                Field::new(column_name, axis.udf_type.logical(), true)
                    .with_metadata(scaling_metadata(&sensor.scaling_factor.to_string())),
            );
            arrays.push(array);
        }
    }

    let schema = Arc::new(Schema::new(fields).with_metadata(HashMap::from([(
        WAS_SCALED_KEY.to_string(),
        "False".to_string(),
    )])));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    debug!(
        "table built: {num_rows} rows, {} columns",
        schema.fields().len()
    );

    Ok(DecodedTable { schema, batch })
}

fn scaling_metadata(factor: &str) -> HashMap<String, String> {
    HashMap::from([(SCALING_FACTOR_KEY.to_string(), factor.to_string())])
}

/// Scatters one axis's sparse `(ts_index, value)` pairs into a dense array
/// of length `num_rows`, null everywhere the axis did not emit.
///
/// If the same row were written more than once (not expected for valid
/// input, spec §4.4), the last write wins because `ts_indices` is walked in
/// append order.
fn scatter_column(udf_type: UdfType, num_rows: usize, store: &SampleStore) -> ArrayRef {
    macro_rules! scatter {
        ($variant:ident, $ty:ty) => {{
            let mut column: Vec<Option<$ty>> = vec![None; num_rows];
            for (value, &row) in store.values.iter().zip(store.ts_indices.iter()) {
                if let UdfValue::$variant(v) = value {
                    column[row] = Some(*v);
                } else {
                    unreachable!("axis type is fixed for the lifetime of its SampleStore");
                }
            }
            column
        }};
    }

    match udf_type {
        UdfType::S8 => Arc::new(Int8Array::from(scatter!(Int8, i8))),
        UdfType::U8 => Arc::new(UInt8Array::from(scatter!(UInt8, u8))),
        UdfType::S16 => Arc::new(Int16Array::from(scatter!(Int16, i16))),
        UdfType::U16 => Arc::new(UInt16Array::from(scatter!(UInt16, u16))),
        UdfType::S32 => Arc::new(Int32Array::from(scatter!(Int32, i32))),
        UdfType::U24 | UdfType::U32 => Arc::new(UInt32Array::from(scatter!(UInt32, u32))),
        UdfType::S64 => Arc::new(Int64Array::from(scatter!(Int64, i64))),
        UdfType::U64 => Arc::new(UInt64Array::from(scatter!(UInt64, u64))),
        UdfType::F => Arc::new(Float32Array::from(scatter!(Float32, f32))),
        UdfType::D => Arc::new(Float64Array::from(scatter!(Float64, f64))),
        UdfType::S | UdfType::St => {
            let mut column: Vec<Option<String>> = vec![None; num_rows];
            for (value, &row) in store.values.iter().zip(store.ts_indices.iter()) {
                if let UdfValue::Utf8(v) = value {
                    column[row] = Some(v.clone());
                } else {
                    unreachable!("axis type is fixed for the lifetime of its SampleStore");
                }
            }
            Arc::new(StringArray::from(column))
        }
    }
}
