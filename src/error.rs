//! # Error Types
//!
//! Error handling for passdb record transcoding.
//!
//! Two layers exist. [`CodecError`] is what a primitive codec reports: it knows
//! nothing about which field it was working on. The record codec attaches the
//! field name and byte offset with [`CodecError::at`], producing a
//! [`PassdbError`], which is what callers see.
//!
//! ## Error Categories
//! - **Buffer errors**: truncated input, oversized length prefixes, missing terminators
//! - **Value errors**: malformed hex passwords, wrong value kinds, integers too wide
//! - **Schema errors**: unknown field names, unsupported version numbers
//! - **Configuration / export errors**: TOML, JSON and bincode failures
//!
//! ## Example Usage
//! ```rust
//! use passdb_codec::error::PassdbError;
//! use passdb_codec::{Record, SchemaVersion};
//!
//! let schema = SchemaVersion::V3.schema();
//! match Record::decode(schema, &[0x01, 0x00]) {
//!     Err(PassdbError::BufferTooShort { field, offset, .. }) => {
//!         assert_eq!(field, "logon_time");
//!         assert_eq!(offset, 0);
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Failure reported by a single primitive codec, without field context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("need {needed} bytes but only {available} remain")]
    Truncated { needed: usize, available: usize },

    #[error("malformed hex text: {0}")]
    MalformedHex(#[from] hex::FromHexError),

    #[error("expected {expected} value, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} does not fit in {bits} bits")]
    OutOfRange { value: u32, bits: u8 },

    #[error("length prefix {length} exceeds limit of {limit} bytes")]
    FieldTooLarge { length: usize, limit: usize },

    #[error("string payload is not NUL-terminated")]
    MissingTerminator,
}

impl CodecError {
    /// Attach the field name and the offset of the field's first byte.
    pub fn at(self, field: &'static str, offset: usize) -> PassdbError {
        match self {
            CodecError::Truncated { needed, available } => PassdbError::BufferTooShort {
                field,
                offset,
                needed,
                available,
            },
            CodecError::MalformedHex(source) => PassdbError::MalformedHexText { field, source },
            CodecError::TypeMismatch { expected, found } => PassdbError::TypeMismatch {
                field,
                expected,
                found,
            },
            CodecError::OutOfRange { value, bits } => {
                PassdbError::ValueOutOfRange { field, value, bits }
            }
            CodecError::FieldTooLarge { length, limit } => PassdbError::FieldTooLarge {
                field,
                offset,
                length,
                limit,
            },
            CodecError::MissingTerminator => PassdbError::MissingTerminator { field, offset },
        }
    }
}

// PassdbError is the primary error type for all record operations
#[derive(Error, Debug)]
pub enum PassdbError {
    #[error("buffer too short for field '{field}' at offset {offset}: need {needed} bytes, {available} available")]
    BufferTooShort {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unknown field '{0}' for this schema")]
    UnknownField(String),

    #[error("malformed hex text in password field '{field}': {source}")]
    MalformedHexText {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("field '{field}' expects a {expected} value, got {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} for field '{field}' does not fit in {bits} bits")]
    ValueOutOfRange {
        field: &'static str,
        value: u32,
        bits: u8,
    },

    #[error("field '{field}' at offset {offset} declares {length} bytes (limit {limit})")]
    FieldTooLarge {
        field: &'static str,
        offset: usize,
        length: usize,
        limit: usize,
    },

    #[error("string field '{field}' at offset {offset} is missing its NUL terminator")]
    MissingTerminator { field: &'static str, offset: usize },

    #[error("record ended after {consumed} of {total} bytes")]
    TrailingBytes { consumed: usize, total: usize },

    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(u32),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Deserialize error: {0}")]
    DeserializeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Type alias for Results using PassdbError
pub type Result<T> = std::result::Result<T, PassdbError>;
