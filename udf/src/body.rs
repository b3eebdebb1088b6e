//! The UDF body parser.
//!
//! Walks the tagged binary body that follows the header, producing a global
//! timestamp sequence, a parallel label sequence, and, per sensor tag, a
//! [`SampleStore`] per axis holding that axis's sparse values and the
//! timestamp index each one is anchored to. Dispatch is a single byte-value
//! match per record; the only state is the cursor (spec §4.5).

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::err::UdfError;
use crate::schema::SensorSchema;
use crate::value::UdfValue;

/// Timestamp record tags. Both are treated identically; the distinction (if
/// any) belongs to the logger that emitted the file, not this decoder.
const TAG_TIMESTAMP: [u8; 2] = [0xF0, 0xF1];
/// Label record tag.
const TAG_LABEL: u8 = 0xF8;

/// Bytes consumed by a timestamp record after its tag byte.
const TIMESTAMP_BODY_LEN: usize = 8;
/// Bytes consumed by a label record after its tag byte. The source this
/// format was distilled from advances the cursor by only 8 bytes here,
/// which under-reads a 16-byte field — treated as a bug, not a contract;
/// this decoder advances the full 16 bytes it reads.
const LABEL_BODY_LEN: usize = 16;

/// One axis's accumulated samples: values in append order, paired with the
/// index into the global timestamp sequence each value was observed at.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleStore {
    /// Decoded values, in the order they were read off the wire.
    pub values: Vec<UdfValue>,
    /// `ts_indices[k]` is the position in the timestamp stream at which
    /// `values[k]` was observed.
    pub ts_indices: Vec<usize>,
}

impl SampleStore {
    fn push(&mut self, value: UdfValue, ts_index: usize) {
        self.values.push(value);
        self.ts_indices.push(ts_index);
    }
}

/// Everything the body parser produces: the global time axis, the aligned
/// label stream, and each surviving sensor's per-axis sample stores.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyResult {
    /// Nanosecond timestamps in file order.
    pub timestamps: Vec<u64>,
    /// Labels aligned by position with `timestamps`; `None` where no label
    /// was attached.
    pub labels: Vec<Option<String>>,
    /// Per-sensor, per-axis sample stores. Sensors that contributed zero
    /// samples are absent (spec §4.3: pruned after parsing).
    pub samples: BTreeMap<u8, Vec<SampleStore>>,
}

/// Parses the body starting at `cursor` in `blob`, using `sensors` to
/// recognize event-record tags and their axis layouts.
///
/// In strict mode (`strict == true`), a truncated record propagates
/// [`UdfError::TruncatedEvent`] immediately. In lenient mode, the same
/// condition stops parsing and returns everything accumulated so far as a
/// successful result, logging a warning.
pub fn parse_body(
    blob: &[u8],
    mut cursor: usize,
    sensors: &BTreeMap<u8, SensorSchema>,
    strict: bool,
) -> Result<BodyResult, UdfError> {
    let mut timestamps = Vec::new();
    let mut labels: Vec<Option<String>> = Vec::new();
    let mut samples: BTreeMap<u8, Vec<SampleStore>> = sensors
        .iter()
        .map(|(&tag, schema)| (tag, vec![SampleStore::default(); schema.axes.len()]))
        .collect();

    while cursor < blob.len() {
        let tag = blob[cursor];

        if TAG_TIMESTAMP.contains(&tag) {
            let record_len = 1 + TIMESTAMP_BODY_LEN;
            match take_record(blob, cursor, record_len, strict)? {
                Some(record) => {
                    let ts = u64::from_le_bytes([
                        record[1], record[2], record[3], record[4], record[5], record[6],
                        record[7], record[8],
                    ]);
                    timestamps.push(ts);
                    labels.push(None);
                    cursor += record_len;
                }
                None => break,
            }
        } else if tag == TAG_LABEL {
            if timestamps.is_empty() {
                return Err(UdfError::LabelWithoutTimestamp);
            }
            let record_len = 1 + LABEL_BODY_LEN;
            match take_record(blob, cursor, record_len, strict)? {
                Some(record) => {
                    let raw = &record[1..1 + LABEL_BODY_LEN];
                    let nul = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
                    let label = String::from_utf8_lossy(&raw[..nul]).into_owned();
                    let last = labels.len() - 1;
                    labels[last] = Some(label);
                    cursor += record_len;
                }
                None => break,
            }
        } else if let Some(schema) = sensors.get(&tag) {
            let record_len = 1 + schema.event_byte_len();
            match take_record(blob, cursor, record_len, strict)? {
                Some(record) => {
                    // An event anchors to the most recently appended
                    // timestamp. An event with no preceding timestamp has
                    // no row to anchor to; it is dropped rather than raising
                    // an error not named in spec §7.
                    let ts_index = match timestamps.len().checked_sub(1) {
                        Some(idx) => idx,
                        None => {
                            warn!(
                                "dropping event for sensor tag {tag} at offset {cursor}: no timestamp seen yet"
                            );
                            cursor += record_len;
                            continue;
                        }
                    };
                    let axis_stores = samples.get_mut(&tag).expect("sensor present in map");
                    let mut offset = 1;
                    for (axis, store) in schema.axes.iter().zip(axis_stores.iter_mut()) {
                        let width = axis.udf_type.wire_width();
                        let value = axis.udf_type.decode(&record[offset..offset + width]);
                        store.push(value, ts_index);
                        offset += width;
                    }
                    cursor += record_len;
                }
                None => break,
            }
        } else {
            return Err(UdfError::UnrecognizedTag(tag, cursor));
        }
    }

    samples.retain(|_, axis_stores| axis_stores.iter().any(|s| !s.values.is_empty()));

    debug!(
        "body parsed: {} timestamps, {} sensors with samples",
        timestamps.len(),
        samples.len()
    );

    Ok(BodyResult {
        timestamps,
        labels,
        samples,
    })
}

/// Returns the next `len` bytes starting at `cursor`, or handles truncation
/// per `strict`: `Err` in strict mode, `Ok(None)` (meaning "stop parsing
/// here") in lenient mode.
fn take_record<'a>(
    blob: &'a [u8],
    cursor: usize,
    len: usize,
    strict: bool,
) -> Result<Option<&'a [u8]>, UdfError> {
    let available = blob.len() - cursor;
    if available < len {
        if strict {
            return Err(UdfError::TruncatedEvent {
                offset: cursor,
                needed: len,
                available,
            });
        }
        warn!(
            "truncated record at offset {cursor}: needed {len} bytes, found {available}; stopping (lenient mode)"
        );
        return Ok(None);
    }
    Ok(Some(&blob[cursor..cursor + len]))
}
