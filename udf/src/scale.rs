//! The scaling pass: a pure table-to-table transform (spec §4.4).
//!
//! Every data column is promoted to `float64` and each non-null cell is
//! multiplied by its column's `scaling_factor` metadata. The time and
//! labels columns are untouched. Scaling is idempotent only when every
//! factor is `1.0`; applying it twice otherwise double-scales, so callers
//! must not call [`scale`] on an already-scaled table (spec §4.4 leaves
//! this as the caller's responsibility, not a runtime check here).

use std::sync::Arc;

use arrow_array::{Array, ArrayRef, Float64Array};
use arrow_schema::{DataType, Field, Schema};
use log::debug;

use crate::err::UdfError;
use crate::table::{DecodedTable, LABELS_COLUMN_NAME, SCALING_FACTOR_KEY, TIME_COLUMN_NAME, WAS_SCALED_KEY};

/// Applies each column's scaling factor, promoting every data column to
/// `float64`.
pub fn scale(table: &DecodedTable) -> Result<DecodedTable, UdfError> {
    let mut fields = Vec::with_capacity(table.schema.fields().len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.batch.num_columns());

    for (field, column) in table.schema.fields().iter().zip(table.batch.columns()) {
        if field.name() == TIME_COLUMN_NAME || field.name() == LABELS_COLUMN_NAME {
            fields.push(field.as_ref().clone());
            arrays.push(column.clone());
            continue;
        }

        let factor: f64 = field
            .metadata()
            .get(SCALING_FACTOR_KEY)
            .map(|s| s.as_str())
            .unwrap_or("1.0")
            .parse()
            .unwrap_or(1.0);

        let scaled = scale_column(column, factor);
        fields.push(
            Field::new(field.name().as_str(), DataType::Float64, true)
                .with_metadata(field.metadata().clone()),
        );
        arrays.push(scaled);
    }

    let mut metadata = table.schema.metadata().clone();
    metadata.insert(WAS_SCALED_KEY.to_string(), "True".to_string());
    let schema = Arc::new(Schema::new(fields).with_metadata(metadata));
    let batch = arrow_array::RecordBatch::try_new(schema.clone(), arrays)?;

    debug!("scaling applied to {} columns", schema.fields().len() - 2);

    Ok(DecodedTable { schema, batch })
}

/// Multiplies every non-null cell of `column` by `factor`, producing a
/// `Float64Array` of the same length and null positions.
fn scale_column(column: &ArrayRef, factor: f64) -> ArrayRef {
    let values: Vec<Option<f64>> = (0..column.len())
        .map(|i| {
            if column.is_null(i) {
                None
            } else {
                Some(numeric_value_at(column, i) * factor)
            }
        })
        .collect();
    Arc::new(Float64Array::from(values))
}

/// Reads the numeric value at `index` out of `column` as an `f64`,
/// regardless of which integer/float logical type it was decoded as.
fn numeric_value_at(column: &ArrayRef, index: usize) -> f64 {
    use arrow_array::{
        Float32Array, Float64Array as F64Arr, Int16Array, Int32Array, Int64Array, Int8Array,
        UInt16Array, UInt32Array, UInt64Array, UInt8Array,
    };

    macro_rules! try_as {
        ($arr_ty:ty) => {
            if let Some(arr) = column.as_any().downcast_ref::<$arr_ty>() {
                return arr.value(index) as f64;
            }
        };
    }

    try_as!(Int8Array);
    try_as!(UInt8Array);
    try_as!(Int16Array);
    try_as!(UInt16Array);
    try_as!(Int32Array);
    try_as!(UInt32Array);
    try_as!(Int64Array);
    try_as!(UInt64Array);
    try_as!(Float32Array);
    try_as!(F64Arr);

    unreachable!("every data column is one of the UdfType-mapped numeric arrays")
}
