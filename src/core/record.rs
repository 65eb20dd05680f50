//! # Records
//!
//! A [`Record`] is the set of values of one passdb entry, bound to the
//! [`Schema`] it was decoded with or created for. [`RecordCodec`] walks a
//! schema's field list in order, driving each field's primitive codec.
//!
//! ## Decoding
//! ```text
//! cursor = 0
//! for field in schema:
//!     (n, value) = field.codec.decode(buf[cursor..])
//!     record[field] = value; cursor += n
//! ```
//! There is no padding, alignment or tagging between fields. Encoding
//! concatenates each field's wire form in the same order, substituting the
//! codec's absent value for unset fields.
//!
//! ## Example
//! ```rust
//! use passdb_codec::{Record, SchemaVersion, Value};
//!
//! let mut record = Record::new(SchemaVersion::V3.schema());
//! record.set("username", "alice").unwrap();
//! record.set("nt_pw", Value::hex("8846f7eaee8fb117ad06bdd830b7586c")).unwrap();
//!
//! let bytes = record.encode().unwrap();
//! let decoded = Record::decode(SchemaVersion::V3.schema(), &bytes).unwrap();
//! assert_eq!(decoded.get_str("username"), Some("alice"));
//! assert_eq!(decoded, record);
//! ```

use crate::config::CodecConfig;
use crate::core::primitives::{Codec, FieldLimits};
use crate::core::value::Value;
use crate::error::{PassdbError, Result};
use crate::schema::Schema;
use crate::utils::metrics::{Metrics, Timer};
use bytes::{Bytes, BytesMut};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Values of one passdb entry under a fixed schema.
///
/// Unset fields are `None` and behave like the codec's absent value.
#[derive(Clone)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<Option<Value>>,
}

impl Record {
    /// An empty record: every field unset.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: vec![None; schema.len()],
        }
    }

    /// Decode `buf` with the default codec configuration.
    pub fn decode(schema: &'static Schema, buf: &[u8]) -> Result<Self> {
        RecordCodec::default().decode(schema, buf)
    }

    /// Encode with the default codec configuration.
    pub fn encode(&self) -> Result<Bytes> {
        RecordCodec::default().encode(self)
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Store `value` under `name`, replacing any previous value.
    ///
    /// Fails with `UnknownField` if the schema has no such field, and with
    /// `TypeMismatch` / `ValueOutOfRange` / `MalformedHexText` if the value
    /// cannot be encoded by the field's codec. The record is unchanged on error.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.schema.require(name)?;
        let field = &self.schema.fields()[index];
        let value = field
            .codec
            .normalize(value.into())
            .map_err(|e| e.at(field.name, 0))?;
        self.values[index] = Some(value);
        Ok(())
    }

    /// Value stored under `name`; `None` if unset or not in the schema.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .index_of(name)
            .and_then(|index| self.values[index].as_ref())
    }

    pub fn get_u32(&self, name: &str) -> Option<u32> {
        self.get(name).and_then(Value::as_u32)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(Value::as_bytes)
    }

    pub fn get_password(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_hex)
    }

    /// Clear a field back to unset, returning the previous value.
    pub fn unset(&mut self, name: &str) -> Result<Option<Value>> {
        let index = self.schema.require(name)?;
        Ok(self.values[index].take())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fields in schema order with their effective value.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Value)> + '_ {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.name, effective(field.codec.absent(), value)))
    }

    /// Exact size of [`Record::encode`]'s output.
    pub fn encoded_len(&self) -> usize {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(field, value)| {
                let payload = match value {
                    Some(Value::Text(text)) => text.len() + 1,
                    Some(Value::Blob(bytes)) => bytes.len(),
                    Some(Value::Hex(text)) => text.len() / 2,
                    _ => 0,
                };
                field.codec.min_len() + payload
            })
            .sum()
    }

    /// Copy every same-named field into a fresh record for `target`.
    ///
    /// Fields the target lacks are dropped; fields only the target has stay
    /// unset. Fails if a value does not fit the target codec, for example
    /// an `acct_ctrl` above 16 bits moving to a pre-V3 layout.
    pub fn convert(&self, target: &'static Schema) -> Result<Record> {
        let mut converted = Record::new(target);
        for (field, value) in self.schema.fields().iter().zip(&self.values) {
            let Some(value) = value else { continue };
            if target.contains(field.name) {
                converted.set(field.name, value.clone())?;
            } else {
                debug!(field = field.name, target = target.name(), "Dropping field during conversion");
            }
        }
        Ok(converted)
    }
}

fn effective(absent: Value, value: &Option<Value>) -> Value {
    match value {
        None | Some(Value::Absent) => absent,
        Some(v) => v.clone(),
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.iter().eq(other.iter())
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (field, value) in self.schema.fields().iter().zip(&self.values) {
            if let Some(value) = value {
                map.entry(&field.name, value);
            }
        }
        map.finish()
    }
}

/// Schema-driven record decoder and encoder.
///
/// Stateless apart from its configuration and an optional metrics sink, so
/// one codec can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct RecordCodec {
    config: CodecConfig,
    metrics: Option<Arc<Metrics>>,
}

impl RecordCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    /// Report decode/encode counts into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn limits(&self) -> FieldLimits {
        FieldLimits {
            max_field_len: self.config.max_field_len,
            strict_terminator: self.config.strict_terminator,
        }
    }

    /// Decode a whole buffer.
    ///
    /// Bytes after the last field are ignored unless `reject_trailing_bytes`
    /// is configured.
    #[instrument(skip(self, schema, buf), fields(schema = schema.name(), len = buf.len()))]
    pub fn decode(&self, schema: &'static Schema, buf: &[u8]) -> Result<Record> {
        let _timer = Timer::start("decode_record");
        let (record, consumed) = self.walk_fields(schema, buf)?;
        if consumed < buf.len() {
            if self.config.reject_trailing_bytes {
                self.count_decode_error();
                return Err(PassdbError::TrailingBytes {
                    consumed,
                    total: buf.len(),
                });
            }
            debug!(consumed, trailing = buf.len() - consumed, "Ignoring trailing bytes");
        }
        self.count_decoded(consumed);
        Ok(record)
    }

    /// Decode the front of `buf`, returning the record and the bytes consumed.
    pub fn decode_prefix(&self, schema: &'static Schema, buf: &[u8]) -> Result<(Record, usize)> {
        let (record, consumed) = self.walk_fields(schema, buf)?;
        self.count_decoded(consumed);
        Ok((record, consumed))
    }

    fn walk_fields(&self, schema: &'static Schema, buf: &[u8]) -> Result<(Record, usize)> {
        let limits = self.limits();
        let mut values = Vec::with_capacity(schema.len());
        let mut cursor = 0;

        for field in schema.fields() {
            let (consumed, value) = match field.codec.decode_with(&buf[cursor..], &limits) {
                Ok(decoded) => decoded,
                Err(e) => {
                    self.count_decode_error();
                    return Err(e.at(field.name, cursor));
                }
            };
            trace!(field = field.name, offset = cursor, consumed, "Decoded field");
            cursor += consumed;
            values.push(Some(value));
        }

        Ok((Record { schema, values }, cursor))
    }

    /// Encode every field in schema order.
    #[instrument(skip(self, record), fields(schema = record.schema.name()))]
    pub fn encode(&self, record: &Record) -> Result<Bytes> {
        let _timer = Timer::start("encode_record");
        let mut dst = BytesMut::with_capacity(record.encoded_len());
        if let Err(e) = self.encode_into(record, &mut dst) {
            if let Some(metrics) = &self.metrics {
                metrics.encode_error();
            }
            return Err(e);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_encoded(dst.len() as u64);
        }
        debug!(len = dst.len(), "Encoded record");
        Ok(dst.freeze())
    }

    /// Append the encoded record to `dst`.
    ///
    /// Fails with `FieldTooLarge` for any field this codec could not decode
    /// back; `dst` may then hold a partial record.
    pub fn encode_into(&self, record: &Record, dst: &mut BytesMut) -> Result<()> {
        let limits = self.limits();
        let start = dst.len();
        for (field, value) in record.schema.fields().iter().zip(&record.values) {
            let offset = dst.len() - start;
            let value = value.as_ref().unwrap_or(&Value::Absent);
            field
                .codec
                .encode_with(value, dst, &limits)
                .map_err(|e| e.at(field.name, offset))?;
        }
        Ok(())
    }

    fn count_decoded(&self, consumed: usize) {
        if let Some(metrics) = &self.metrics {
            metrics.record_decoded(consumed as u64);
        }
    }

    fn count_decode_error(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.decode_error();
        }
    }
}

/// Decode `buf` under `schema` with default settings.
pub fn decode(schema: &'static Schema, buf: &[u8]) -> Result<Record> {
    Record::decode(schema, buf)
}

/// Encode `record` with default settings.
pub fn encode(record: &Record) -> Result<Bytes> {
    record.encode()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::core::primitives::CodecKind;
    use crate::schema::FieldDescriptor;
    use crate::schema::SchemaVersion;

    static PAIR: Schema = Schema::custom(
        "pair",
        &[
            FieldDescriptor::new("id", CodecKind::Uint16),
            FieldDescriptor::new("name", CodecKind::String),
        ],
    );

    #[test]
    fn test_decode_walks_fields_in_order() {
        let buf = [0x07, 0x00, 3, 0, 0, 0, b'a', b'b', 0];
        let (record, consumed) = RecordCodec::default().decode_prefix(&PAIR, &buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(record.get_u32("id"), Some(7));
        assert_eq!(record.get_str("name"), Some("ab"));
    }

    #[test]
    fn test_buffer_too_short_reports_field_and_offset() {
        let buf = [0x07, 0x00, 9, 0, 0, 0, b'a'];
        match Record::decode(&PAIR, &buf) {
            Err(PassdbError::BufferTooShort {
                field,
                offset,
                needed,
                available,
            }) => {
                assert_eq!(field, "name");
                assert_eq!(offset, 2);
                assert_eq!(needed, 13);
                assert_eq!(available, 5);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_unset_fields_encode_as_absent() {
        let record = Record::new(&PAIR);
        assert_eq!(record.encode().unwrap().as_ref(), &[0, 0, 0, 0, 0, 0]);
        assert_eq!(record.encoded_len(), 6);
    }

    #[test]
    fn test_set_unknown_field_leaves_record_untouched() {
        let mut record = Record::new(&PAIR);
        record.set("id", 1u16).unwrap();
        let before = record.clone();
        assert!(matches!(
            record.set("nope", 2u16),
            Err(PassdbError::UnknownField(name)) if name == "nope"
        ));
        assert_eq!(record, before);
    }

    #[test]
    fn test_set_overwrites() {
        let mut record = Record::new(&PAIR);
        record.set("name", "first").unwrap();
        record.set("name", "second").unwrap();
        assert_eq!(record.get_str("name"), Some("second"));
        assert_eq!(record.unset("name").unwrap(), Some(Value::from("second")));
        assert!(!record.is_set("name"));
    }

    #[test]
    fn test_set_type_checked() {
        let mut record = Record::new(&PAIR);
        assert!(matches!(
            record.set("id", "text"),
            Err(PassdbError::TypeMismatch { field: "id", .. })
        ));
        assert!(matches!(
            record.set("id", 70_000u32),
            Err(PassdbError::ValueOutOfRange { field: "id", bits: 16, .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_policy() {
        let buf = [1, 0, 0, 0, 0, 0, 0xff];
        assert!(Record::decode(&PAIR, &buf).is_ok());

        let strict = RecordCodec::new(CodecConfig {
            reject_trailing_bytes: true,
            ..CodecConfig::default()
        });
        assert!(matches!(
            strict.decode(&PAIR, &buf),
            Err(PassdbError::TrailingBytes { consumed: 6, total: 7 })
        ));
    }

    #[test]
    fn test_equality_treats_unset_as_absent() {
        let mut a = Record::new(&PAIR);
        let b = Record::new(&PAIR);
        a.set("id", 0u16).unwrap();
        a.set("name", None::<&str>).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_metrics_are_recorded() {
        let metrics = Arc::new(Metrics::new());
        let codec = RecordCodec::default().with_metrics(metrics.clone());

        let bytes = codec.encode(&Record::new(&PAIR)).unwrap();
        codec.decode(&PAIR, &bytes).unwrap();
        assert!(codec.decode(&PAIR, &bytes[..3]).is_err());

        let snap = metrics.snapshot();
        assert_eq!(snap.records_encoded, 1);
        assert_eq!(snap.records_decoded, 1);
        assert_eq!(snap.bytes_decoded, 6);
        assert_eq!(snap.decode_errors, 1);
    }

    #[test]
    fn test_rejected_trailing_bytes_count_only_as_error() {
        let metrics = Arc::new(Metrics::new());
        let codec = RecordCodec::new(CodecConfig {
            reject_trailing_bytes: true,
            ..CodecConfig::default()
        })
        .with_metrics(metrics.clone());

        let buf = [1, 0, 0, 0, 0, 0, 0xff];
        assert!(codec.decode(&PAIR, &buf).is_err());
        let snap = metrics.snapshot();
        assert_eq!(snap.records_decoded, 0);
        assert_eq!(snap.bytes_decoded, 0);
        assert_eq!(snap.decode_errors, 1);

        codec.decode(&PAIR, &buf[..6]).unwrap();
        assert_eq!(metrics.snapshot().records_decoded, 1);
        assert_eq!(metrics.snapshot().bytes_decoded, 6);
    }

    #[test]
    fn test_encode_respects_configured_limit() {
        let metrics = Arc::new(Metrics::new());
        let codec = RecordCodec::new(CodecConfig {
            max_field_len: 4,
            ..CodecConfig::default()
        })
        .with_metrics(metrics.clone());

        let mut record = Record::new(&PAIR);
        record.set("name", "abc").unwrap();
        let bytes = codec.encode(&record).unwrap();
        assert_eq!(codec.decode(&PAIR, &bytes).unwrap(), record);

        record.set("name", "abcd").unwrap();
        assert!(matches!(
            codec.encode(&record),
            Err(PassdbError::FieldTooLarge { field: "name", offset: 2, length: 5, limit: 4 })
        ));
        assert_eq!(metrics.snapshot().encode_errors, 1);
    }

    #[test]
    fn test_convert_v2_to_v3() {
        let mut v2 = Record::new(SchemaVersion::V2.schema());
        v2.set("username", "carol").unwrap();
        v2.set("unknown_str", "legacy").unwrap();
        v2.set("acct_ctrl", 0x0010u16).unwrap();

        let v3 = v2.convert(SchemaVersion::V3.schema()).unwrap();
        assert_eq!(v3.get_str("username"), Some("carol"));
        assert_eq!(v3.get_u32("acct_ctrl"), Some(0x0010));
        assert!(!v3.is_set("comment"));
        assert!(v3.get("unknown_str").is_none());
    }

    #[test]
    fn test_convert_rejects_narrowing() {
        let mut v3 = Record::new(SchemaVersion::V3.schema());
        v3.set("acct_ctrl", 0x0002_0000u32).unwrap();
        assert!(matches!(
            v3.convert(SchemaVersion::V2.schema()),
            Err(PassdbError::ValueOutOfRange { field: "acct_ctrl", .. })
        ));
    }
}
