//! The UDF header parser.
//!
//! Consumes the text header that precedes the binary body and yields, per
//! sensor tag, a [`SensorSchema`] describing how to decode that sensor's
//! events. The two supported format versions (`1.0`, `1.1`) share this one
//! parser behind a [`UdfVersion`] flag rather than two separate schema loops.

use std::collections::BTreeMap;

use crate::err::UdfError;
use crate::types::UdfType;

/// The UDF header terminator: a blank `\r\n` line.
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// In v1.1 only, this many additional bytes (a fixed schema terminator)
/// follow the header terminator before the body begins.
const V1_1_SCHEMA_TERMINATOR_LEN: usize = 6;

/// Sensor tags at or above this value are reserved for body control records
/// (`0xF0`/`0xF1` timestamps, `0xF8` labels).
const RESERVED_TAG_START: u8 = 0xF0;

/// The UDF header format version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UdfVersion {
    /// `1.0` — no sampling rate or properties fields.
    V1_0,
    /// `1.1` — adds sampling rate and properties, and a 6-byte schema
    /// terminator after the header.
    V1_1,
}

/// One axis (scalar channel) within a sensor's event.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisSchema {
    /// The axis's name, e.g. `"x"` for one channel of an accelerometer.
    pub name: String,
    /// The axis's resolved UDF type.
    pub udf_type: UdfType,
}

/// The schema declared for one sensor tag in the header.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorSchema {
    /// The one-byte tag that discriminates this sensor's event records in
    /// the body (always `< 0xF0`).
    pub tag: u8,
    /// The sensor's trimmed name, e.g. `"accel"`.
    pub name: String,
    /// The declared total byte length of one event across all axes.
    pub event_size: u32,
    /// The sensor's axes, in declared order. Always non-empty.
    pub axes: Vec<AxisSchema>,
    /// A single multiplier applied uniformly to every axis of this sensor
    /// during the scaling pass.
    pub scaling_factor: f64,
    /// Sampling rate in Hz. `-1.0` for v1.0 files, which don't record one.
    pub sampling_rate: f64,
    /// Opaque sensor properties. `["na"]` for v1.0 files.
    pub properties: Vec<String>,
}

impl SensorSchema {
    /// Sum of this sensor's axis wire widths — the actual byte length of
    /// one event on the wire.
    pub fn event_byte_len(&self) -> usize {
        self.axes.iter().map(|a| a.udf_type.wire_width()).sum()
    }
}

/// The result of parsing a UDF header: the format version, the per-tag
/// sensor schemas, and the byte offset at which the body begins.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedHeader {
    /// The header's declared format version.
    pub version: UdfVersion,
    /// Sensor schemas keyed by tag. A `BTreeMap` so iteration is already in
    /// ascending-tag order, matching the table's deterministic column order.
    pub sensors: BTreeMap<u8, SensorSchema>,
    /// Byte offset of the first record in the body.
    pub body_start: usize,
}

/// Parses a UDF header out of the front of `blob`.
///
/// `blob` is the complete file, header and body together; only the bytes up
/// to (and including) the `\r\n\r\n` terminator are interpreted as the
/// header.
pub fn parse_header(blob: &[u8]) -> Result<ParsedHeader, UdfError> {
    let term_pos = find_subslice(blob, HEADER_TERMINATOR).ok_or_else(|| {
        UdfError::MalformedHeader("missing \\r\\n\\r\\n header terminator".to_string())
    })?;

    let header_text = std::str::from_utf8(&blob[..term_pos])
        .map_err(|e| UdfError::MalformedHeader(format!("header is not valid UTF-8: {e}")))?;

    let mut lines = header_text.split("\r\n");
    let version_str = lines.next().unwrap_or("");
    let version = match version_str {
        "1.0" => UdfVersion::V1_0,
        "1.1" => UdfVersion::V1_1,
        other => return Err(UdfError::UnsupportedVersion(other.to_string())),
    };

    let mut sensors = BTreeMap::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let schema = parse_schema_line(line, version)?;
        if schema.tag >= RESERVED_TAG_START {
            return Err(UdfError::MalformedHeader(format!(
                "tag {} is reserved for body control records (>= 0x{RESERVED_TAG_START:02X})",
                schema.tag
            )));
        }
        if sensors.insert(schema.tag, schema).is_some() {
            return Err(UdfError::MalformedHeader(
                "duplicate sensor tag in header".to_string(),
            ));
        }
    }

    let mut body_start = term_pos + HEADER_TERMINATOR.len();
    if version == UdfVersion::V1_1 {
        body_start += V1_1_SCHEMA_TERMINATOR_LEN;
    }

    Ok(ParsedHeader {
        version,
        sensors,
        body_start,
    })
}

fn parse_schema_line(line: &str, version: UdfVersion) -> Result<SensorSchema, UdfError> {
    let fields: Vec<&str> = line.split(':').collect();
    let expected_fields = match version {
        UdfVersion::V1_0 => 6,
        UdfVersion::V1_1 => 8,
    };
    if fields.len() != expected_fields {
        return Err(UdfError::MalformedHeader(format!(
            "expected {expected_fields} ':'-separated fields, found {} in {line:?}",
            fields.len()
        )));
    }

    let tag: u8 = fields[0]
        .trim()
        .parse()
        .map_err(|_| UdfError::MalformedHeader(format!("invalid sensor tag {:?}", fields[0])))?;
    let name = fields[1].trim().to_string();
    let event_size: u32 = fields[2]
        .trim()
        .parse()
        .map_err(|_| UdfError::MalformedHeader(format!("invalid event_size {:?}", fields[2])))?;

    let type_mnemonics: Vec<&str> = fields[3].split(',').map(str::trim).collect();
    let axis_names: Vec<&str> = fields[4].split(',').map(str::trim).collect();
    if type_mnemonics.len() != axis_names.len() {
        return Err(UdfError::MalformedHeader(format!(
            "type list has {} entries but axis list has {} for sensor tag {tag}",
            type_mnemonics.len(),
            axis_names.len()
        )));
    }
    if type_mnemonics.is_empty() {
        return Err(UdfError::MalformedHeader(format!(
            "sensor tag {tag} declares zero axes"
        )));
    }

    let scaling_factor: f64 = fields[5].trim().parse().map_err(|_| {
        UdfError::MalformedHeader(format!("invalid scaling_factor {:?}", fields[5]))
    })?;

    let (sampling_rate, properties) = match version {
        UdfVersion::V1_0 => (-1.0, vec!["na".to_string()]),
        UdfVersion::V1_1 => {
            let sampling_rate: f64 = fields[6].trim().parse().map_err(|_| {
                UdfError::MalformedHeader(format!("invalid sampling_rate {:?}", fields[6]))
            })?;
            let properties = fields[7].split(',').map(|s| s.trim().to_string()).collect();
            (sampling_rate, properties)
        }
    };

    let mut axes = Vec::with_capacity(type_mnemonics.len());
    for (mnemonic, axis_name) in type_mnemonics.iter().zip(axis_names.iter()) {
        axes.push(AxisSchema {
            name: (*axis_name).to_string(),
            udf_type: UdfType::parse(mnemonic)?,
        });
    }

    let declared_width: usize = axes.iter().map(|a| a.udf_type.wire_width()).sum();
    if declared_width != event_size as usize {
        return Err(UdfError::MalformedHeader(format!(
            "sensor tag {tag}: sum of axis widths ({declared_width}) != event_size ({event_size})"
        )));
    }

    Ok(SensorSchema {
        tag,
        name,
        event_size,
        axes,
        scaling_factor,
        sampling_rate,
        properties,
    })
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_v1_0_single_axis_sensor() {
        let blob = b"1.0\r\n1:temp:2:s16:x:0.1\r\n\r\n";
        let parsed = parse_header(blob).unwrap();
        assert_eq!(parsed.version, UdfVersion::V1_0);
        assert_eq!(parsed.body_start, blob.len());
        let sensor = &parsed.sensors[&1];
        assert_eq!(sensor.name, "temp");
        assert_eq!(sensor.event_size, 2);
        assert_eq!(sensor.axes.len(), 1);
        assert_eq!(sensor.axes[0].name, "x");
        assert_eq!(sensor.axes[0].udf_type, UdfType::S16);
        assert_eq!(sensor.scaling_factor, 0.1);
        assert_eq!(sensor.sampling_rate, -1.0);
        assert_eq!(sensor.properties, vec!["na".to_string()]);
    }

    #[test]
    fn parses_v1_1_two_axis_sensor_and_skips_terminator() {
        let mut blob = b"1.1\r\n2:accel:8:s32,s32:x,y:1.0:1000.0:na\r\n\r\n".to_vec();
        let header_len = blob.len();
        blob.extend_from_slice(&[0u8; 6]);
        let parsed = parse_header(&blob).unwrap();
        assert_eq!(parsed.version, UdfVersion::V1_1);
        assert_eq!(parsed.body_start, header_len + 6);
        let sensor = &parsed.sensors[&2];
        assert_eq!(sensor.axes.len(), 2);
        assert_eq!(sensor.sampling_rate, 1000.0);
        assert_eq!(sensor.properties, vec!["na".to_string()]);
    }

    #[test]
    fn rejects_unsupported_version() {
        let blob = b"2.0\r\n\r\n";
        assert!(matches!(
            parse_header(blob),
            Err(UdfError::UnsupportedVersion(ref v)) if v == "2.0"
        ));
    }

    #[test]
    fn rejects_duplicate_tags() {
        let blob = b"1.0\r\n1:a:1:u8:x:1.0\r\n1:b:1:u8:y:1.0\r\n\r\n";
        assert!(matches!(
            parse_header(blob),
            Err(UdfError::MalformedHeader(_))
        ));
    }

    #[test]
    fn rejects_axis_type_count_mismatch() {
        let blob = b"1.0\r\n1:a:2:u8,u8:x:1.0\r\n\r\n";
        assert!(matches!(
            parse_header(blob),
            Err(UdfError::MalformedHeader(_))
        ));
    }

    #[test]
    fn rejects_event_size_mismatch() {
        let blob = b"1.0\r\n1:a:3:u8:x:1.0\r\n\r\n";
        assert!(matches!(
            parse_header(blob),
            Err(UdfError::MalformedHeader(_))
        ));
    }

    #[test]
    fn rejects_reserved_tag() {
        let blob = b"1.0\r\n240:a:1:u8:x:1.0\r\n\r\n";
        assert!(matches!(
            parse_header(blob),
            Err(UdfError::MalformedHeader(_))
        ));
    }
}
