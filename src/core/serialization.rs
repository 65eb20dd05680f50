//! # Record Export Formats
//!
//! Moves decoded records out of the TDB_PACK wire form into interchange
//! formats, for dumps, diffs and tooling.
//!
//! ## Formats
//! - **Json**: human-readable, one object keyed by field name in schema order
//! - **Bincode**: compact binary, same field map
//!
//! An optional one-byte header names the format so a reader can detect it.
//! Import always needs the target schema: every name is validated through
//! [`Record::set`], so a dump from one version cannot silently land in another.
//!
//! ## Usage
//! ```rust
//! use passdb_codec::core::serialization::{ExportFormat, RecordExport};
//! use passdb_codec::{Record, SchemaVersion};
//!
//! let schema = SchemaVersion::V1.schema();
//! let mut record = Record::new(schema);
//! record.set("username", "dave").unwrap();
//!
//! let json = record.serialize_format(ExportFormat::Json).unwrap();
//! let back = Record::deserialize_format(schema, &json, ExportFormat::Json).unwrap();
//! assert_eq!(back, record);
//! ```

use crate::core::record::Record;
use crate::core::value::Value;
use crate::error::{PassdbError, Result};
use crate::schema::Schema;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Human-readable JSON (default)
    #[default]
    Json,
    /// Binary compact format
    Bincode,
}

impl ExportFormat {
    /// Get the format identifier byte
    pub fn format_byte(self) -> u8 {
        match self {
            ExportFormat::Json => 0x01,
            ExportFormat::Bincode => 0x02,
        }
    }

    /// Detect format from identifier byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ExportFormat::Json),
            0x02 => Some(ExportFormat::Bincode),
            _ => None,
        }
    }

    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Bincode => "Bincode",
        }
    }
}

/// Serializes as a map of every schema field to its effective value.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema().len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Export/import of records in the supported formats
pub trait RecordExport: Sized {
    /// Serialize to bytes using the specified format
    fn serialize_format(&self, format: ExportFormat) -> Result<Vec<u8>>;

    /// Serialize to bytes with format header
    fn serialize_with_header(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let mut data = vec![format.format_byte()];
        let mut payload = self.serialize_format(format)?;
        data.append(&mut payload);
        Ok(data)
    }

    /// Deserialize from bytes using the specified format
    fn deserialize_format(schema: &'static Schema, data: &[u8], format: ExportFormat)
        -> Result<Self>;

    /// Deserialize from bytes with format header
    fn deserialize_with_header(schema: &'static Schema, data: &[u8]) -> Result<(Self, ExportFormat)> {
        let Some((&first, rest)) = data.split_first() else {
            return Err(PassdbError::DeserializeError("Empty data".to_string()));
        };

        let format = ExportFormat::from_byte(first).ok_or_else(|| {
            PassdbError::DeserializeError(format!("Unknown format byte: {first}"))
        })?;

        let value = Self::deserialize_format(schema, rest, format)?;
        Ok((value, format))
    }
}

impl RecordExport for Record {
    fn serialize_format(&self, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Json => serde_json::to_vec(self)
                .map_err(|e| PassdbError::SerializeError(e.to_string())),
            ExportFormat::Bincode => bincode::serialize(self)
                .map_err(|e| PassdbError::SerializeError(e.to_string())),
        }
    }

    fn deserialize_format(
        schema: &'static Schema,
        data: &[u8],
        format: ExportFormat,
    ) -> Result<Self> {
        let fields: BTreeMap<String, Value> = match format {
            ExportFormat::Json => serde_json::from_slice(data)
                .map_err(|e| PassdbError::DeserializeError(e.to_string()))?,
            ExportFormat::Bincode => bincode::deserialize(data)
                .map_err(|e| PassdbError::DeserializeError(e.to_string()))?,
        };

        let mut record = Record::new(schema);
        for (name, value) in fields {
            record.set(&name, value)?;
        }
        Ok(record)
    }
}

impl Record {
    /// See [`RecordExport::deserialize_format`].
    pub fn deserialize_format(
        schema: &'static Schema,
        data: &[u8],
        format: ExportFormat,
    ) -> Result<Self> {
        <Self as RecordExport>::deserialize_format(schema, data, format)
    }
}
