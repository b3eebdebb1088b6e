//! Error types for the udf crate.
//!
//! [`UdfError`] is the single error type returned by every fallible core
//! operation (header parsing, body parsing, table construction, scaling).
//! Errors are never caught inside the core — they propagate unchanged to the
//! caller, who decides whether to retry, report, or abort.

/// The error type for the udf crate.
///
/// One variant per failure kind the decoder can raise. All are fatal to the
/// current `decode` call; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum UdfError {
    /// The header's format-version line was not `1.0` or `1.1`.
    #[error("unsupported UDF format version: {0:?}")]
    UnsupportedVersion(String),

    /// The header is structurally invalid: wrong field count, non-numeric
    /// field where a number is expected, duplicate sensor tag, a type/axis
    /// count mismatch, or `sum(axis widths) != event_size`.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// A type mnemonic appearing in the header is not in [`crate::types::UdfType`]'s
    /// registry.
    #[error("unknown UDF type mnemonic: {0:?}")]
    UnknownType(String),

    /// A byte at a body record boundary was neither a timestamp/label control
    /// tag nor a tag declared in the header.
    #[error("unrecognized body tag 0x{0:02X} at offset {1}")]
    UnrecognizedTag(u8, usize),

    /// Too few bytes remained to complete the current record.
    ///
    /// Raised in strict mode; tolerated (with a logged warning, and the
    /// bytes parsed so far returned) in lenient mode.
    #[error("truncated event at offset {offset}: needed {needed} bytes, found {available}")]
    TruncatedEvent {
        /// Byte offset of the record that could not be completed.
        offset: usize,
        /// Bytes required to complete the record.
        needed: usize,
        /// Bytes actually remaining in the blob.
        available: usize,
    },

    /// A `0xF8` label record appeared before any `0xF0`/`0xF1` timestamp
    /// record, so there is no row position to attach the label to.
    #[error("label record encountered before any timestamp")]
    LabelWithoutTimestamp,

    /// Error constructing the output Arrow schema or record batch.
    #[error("{0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}
