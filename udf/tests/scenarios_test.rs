//! End-to-end decode scenarios, built as in-memory byte blobs rather than
//! fixture files — UDF inputs for these scenarios are a handful of bytes
//! each, so there is nothing a fixture file would buy over an inline
//! builder.

use arrow_array::{Array, StringArray, UInt8Array};
use udf::{decode, DecodeOptions, UdfError};

fn timestamp_record(ts: u64) -> Vec<u8> {
    let mut record = vec![0xF0u8];
    record.extend_from_slice(&ts.to_le_bytes());
    record
}

fn label_record(label: &str) -> Vec<u8> {
    let mut record = vec![0xF8u8];
    let mut field = [0u8; 16];
    field[..label.len()].copy_from_slice(label.as_bytes());
    record.extend_from_slice(&field);
    record
}

#[test]
fn s3_interleaved_sensors_produce_three_rows_with_disjoint_nulls() {
    let mut blob = b"1.0\r\n1:a:1:u8:x:1.0\r\n2:b:1:u8:x:1.0\r\n\r\n".to_vec();
    blob.extend(timestamp_record(0));
    blob.extend([1u8, 10]); // sensor 1
    blob.extend(timestamp_record(1));
    blob.extend([2u8, 20]); // sensor 2
    blob.extend(timestamp_record(2));
    blob.extend([1u8, 30]); // sensor 1 again

    let output = decode(&blob, DecodeOptions::default()).unwrap();
    assert_eq!(output.table.num_rows(), 3);

    let a_x = output
        .table
        .column(2)
        .as_any()
        .downcast_ref::<UInt8Array>()
        .unwrap();
    assert!(!a_x.is_null(0));
    assert!(a_x.is_null(1));
    assert!(!a_x.is_null(2));
    assert_eq!(a_x.value(0), 10);
    assert_eq!(a_x.value(2), 30);

    let b_x = output
        .table
        .column(3)
        .as_any()
        .downcast_ref::<UInt8Array>()
        .unwrap();
    assert!(b_x.is_null(0));
    assert!(!b_x.is_null(1));
    assert!(b_x.is_null(2));
    assert_eq!(b_x.value(1), 20);
}

#[test]
fn s4_label_attaches_to_its_row_only() {
    let mut blob = b"1.0\r\n1:a:1:u8:x:1.0\r\n\r\n".to_vec();
    blob.extend(timestamp_record(0));
    blob.extend([1u8, 7]);
    blob.extend(label_record("note"));
    blob.extend(timestamp_record(1));
    blob.extend([1u8, 8]);

    let output = decode(&blob, DecodeOptions::default()).unwrap();
    let labels = output
        .table
        .column(1)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(labels.value(0), "note");
    assert!(labels.is_null(1));
}

#[test]
fn s5_sensor_absent_from_body_contributes_no_columns() {
    let mut blob = b"1.0\r\n1:a:1:u8:x:1.0\r\n2:b:1:u8:x:1.0\r\n\r\n".to_vec();
    blob.extend(timestamp_record(0));
    blob.extend([1u8, 7]); // only sensor 1 appears

    let output = decode(&blob, DecodeOptions::default()).unwrap();
    let names: Vec<&str> = output
        .schema
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    assert_eq!(names, vec!["Time in ns", "Labels", "a.x"]);
}

#[test]
fn s6_truncated_event_strict_mode_propagates_error() {
    let mut blob = b"1.0\r\n1:a:4:s32:x:1.0\r\n\r\n".to_vec();
    blob.extend(timestamp_record(0));
    blob.push(1);
    blob.extend([0u8, 1u8]);

    assert!(matches!(
        decode(&blob, DecodeOptions::default()),
        Err(UdfError::TruncatedEvent { .. })
    ));
}

#[test]
fn s6_truncated_event_lenient_mode_returns_partial_result() {
    let mut blob = b"1.0\r\n1:a:4:s32:x:1.0\r\n\r\n".to_vec();
    blob.extend(timestamp_record(0));
    blob.push(1);
    blob.extend([0u8, 1u8]);

    let options = DecodeOptions {
        strict: false,
        apply_scaling: false,
    };
    let output = decode(&blob, options).unwrap();
    assert_eq!(output.table.num_rows(), 1);
    // the in-progress sensor 1 event never completed, so it was pruned
    assert_eq!(output.schema.fields().len(), 2);
}

#[test]
fn every_column_shares_the_row_count() {
    let mut blob = b"1.0\r\n1:a:1:u8:x:1.0\r\n\r\n".to_vec();
    for (ts, val) in [(0u64, 1u8), (1, 2), (2, 3)] {
        blob.extend(timestamp_record(ts));
        blob.extend([1u8, val]);
    }

    let output = decode(&blob, DecodeOptions::default()).unwrap();
    let expected_rows = output.table.num_rows();
    for col in output.table.columns() {
        assert_eq!(col.len(), expected_rows);
    }
}

#[test]
fn unknown_type_mnemonic_is_rejected_at_header_parse_time() {
    let blob = b"1.0\r\n1:a:4:q128:x:1.0\r\n\r\n".to_vec();
    assert!(matches!(decode(&blob, DecodeOptions::default()), Err(UdfError::UnknownType(_))));
}

#[test]
fn unrecognized_body_tag_is_rejected() {
    let mut blob = b"1.0\r\n1:a:1:u8:x:1.0\r\n\r\n".to_vec();
    blob.extend(timestamp_record(0));
    blob.push(0x42); // not a timestamp, label, or declared sensor tag
    assert!(matches!(
        decode(&blob, DecodeOptions::default()),
        Err(UdfError::UnrecognizedTag(0x42, _))
    ));
}
