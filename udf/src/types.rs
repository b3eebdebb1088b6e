//! The UDF type registry.
//!
//! [`UdfType`] is a closed, process-wide set of the type mnemonics a UDF
//! header can declare for an axis. Each variant carries its wire width, its
//! Arrow logical type, and its little-endian decoder, resolved once when the
//! header is parsed (see [`crate::schema::parse_header`]) rather than by
//! string comparison on every value — the body parser never inspects a
//! mnemonic again.

use arrow_schema::DataType;

use crate::err::UdfError;
use crate::value::UdfValue;

/// A UDF type mnemonic, resolved to its wire width, Arrow logical type, and
/// little-endian decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UdfType {
    /// `s8` — signed 8-bit.
    S8,
    /// `u8` — unsigned 8-bit.
    U8,
    /// `s16` — signed 16-bit, little-endian.
    S16,
    /// `u16` — unsigned 16-bit, little-endian.
    U16,
    /// `s32` — signed 32-bit, little-endian.
    S32,
    /// `u24` — unsigned 24-bit on the wire, zero-extended to `u32`.
    U24,
    /// `u32` — unsigned 32-bit, little-endian.
    U32,
    /// `s64` — signed 64-bit, little-endian.
    S64,
    /// `u64` — unsigned 64-bit, little-endian.
    U64,
    /// `f` — IEEE-754 single precision, little-endian.
    F,
    /// `d` — IEEE-754 double precision, little-endian.
    D,
    /// `s` — fixed 16-byte NUL-padded UTF-8 string.
    S,
    /// `st` — synonym of `s`.
    St,
}

impl UdfType {
    /// Resolves a trimmed mnemonic from a header line to a `UdfType`.
    ///
    /// Fails with [`UdfError::UnknownType`] for anything outside the
    /// authoritative set in spec §4.1.
    pub fn parse(mnemonic: &str) -> Result<Self, UdfError> {
        match mnemonic {
            "s8" => Ok(Self::S8),
            "u8" => Ok(Self::U8),
            "s16" => Ok(Self::S16),
            "u16" => Ok(Self::U16),
            "s32" => Ok(Self::S32),
            "u24" => Ok(Self::U24),
            "u32" => Ok(Self::U32),
            "s64" => Ok(Self::S64),
            "u64" => Ok(Self::U64),
            "f" => Ok(Self::F),
            "d" => Ok(Self::D),
            "s" => Ok(Self::S),
            "st" => Ok(Self::St),
            other => Err(UdfError::UnknownType(other.to_string())),
        }
    }

    /// Byte width of this type on the wire.
    ///
    /// `u24` is the one special case: it occupies 3 bytes on the wire but
    /// decodes into a 4-byte `u32`.
    pub fn wire_width(self) -> usize {
        match self {
            Self::S8 | Self::U8 => 1,
            Self::S16 | Self::U16 => 2,
            Self::U24 => 3,
            Self::S32 | Self::U32 | Self::F => 4,
            Self::S64 | Self::U64 | Self::D => 8,
            Self::S | Self::St => 16,
        }
    }

    /// The Arrow logical type a column of this UDF type is materialised as.
    pub fn logical(self) -> DataType {
        match self {
            Self::S8 => DataType::Int8,
            Self::U8 => DataType::UInt8,
            Self::S16 => DataType::Int16,
            Self::U16 => DataType::UInt16,
            Self::S32 => DataType::Int32,
            Self::U24 | Self::U32 => DataType::UInt32,
            Self::S64 => DataType::Int64,
            Self::U64 => DataType::UInt64,
            Self::F => DataType::Float32,
            Self::D => DataType::Float64,
            Self::S | Self::St => DataType::Utf8,
        }
    }

    /// Decodes exactly `wire_width()` little-endian bytes into a scalar.
    ///
    /// The caller is responsible for slicing exactly `wire_width()` bytes;
    /// this never panics because every branch consumes a fixed, literal
    /// number of elements off the front of `bytes`.
    pub fn decode(self, bytes: &[u8]) -> UdfValue {
        match self {
            Self::S8 => UdfValue::Int8(bytes[0] as i8),
            Self::U8 => UdfValue::UInt8(bytes[0]),
            Self::S16 => UdfValue::Int16(i16::from_le_bytes([bytes[0], bytes[1]])),
            Self::U16 => UdfValue::UInt16(u16::from_le_bytes([bytes[0], bytes[1]])),
            Self::S32 => UdfValue::Int32(i32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            Self::U24 => {
                // Zero-extend the missing high byte before decoding as u32.
                UdfValue::UInt32(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
            }
            Self::U32 => UdfValue::UInt32(u32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            Self::S64 => UdfValue::Int64(i64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
            Self::U64 => UdfValue::UInt64(u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
            Self::F => UdfValue::Float32(f32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            Self::D => UdfValue::Float64(f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
            Self::S | Self::St => {
                let nul = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                UdfValue::Utf8(String::from_utf8_lossy(&bytes[..nul]).into_owned())
            }
        }
    }
}
