//! Decoded scalar values.
//!
//! [`UdfValue`] is the dynamically-typed result of decoding one axis sample
//! off the wire. A sensor's axes can carry any mix of the logical types in
//! [`crate::types::UdfType`], so a single `Vec<UdfValue>` per axis is the
//! natural accumulator during body parsing; [`crate::table`] later narrows
//! each axis's values into a single concretely-typed Arrow array.

/// One decoded sample value, tagged with its logical type.
#[derive(Clone, Debug, PartialEq)]
pub enum UdfValue {
    /// `s8`
    Int8(i8),
    /// `u8`
    UInt8(u8),
    /// `s16`
    Int16(i16),
    /// `u16`
    UInt16(u16),
    /// `s32`
    Int32(i32),
    /// `u24` (zero-extended) or `u32`
    UInt32(u32),
    /// `s64`
    Int64(i64),
    /// `u64`
    UInt64(u64),
    /// `f`
    Float32(f32),
    /// `d`
    Float64(f64),
    /// `s` / `st`
    Utf8(String),
}
