//! # Primitive Codecs
//!
//! The building blocks of a TDB_PACK record. Every codec turns the front of a
//! byte slice into a [`Value`] and reports how many bytes it consumed, and
//! appends the wire form of a [`Value`] to a [`BytesMut`].
//!
//! ## Wire Forms (little-endian)
//! ```text
//! Uint16       [u16]
//! Uint32       [u32]
//! NulString    [len: u32] [payload (len - 1)] [0x00]     len == 0 => absent
//! Pointer      [len: u32] [payload (len)]                len == 0 => absent
//! HexPassword  same as Pointer, presented as uppercase hex text
//! ```
//!
//! Codecs are stateless unit structs. [`CodecKind`] names one of them so a
//! field descriptor can be a plain `Copy` constant.

use crate::core::value::Value;
use crate::error::CodecError;
use bytes::{BufMut, BytesMut};
use tracing::warn;

/// Width of every length prefix.
pub const LENGTH_PREFIX: usize = 4;

/// Per-field limits shared by decode and encode.
///
/// A record encoded under some limits always decodes under the same limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    /// Largest length prefix accepted for a single field.
    pub max_field_len: usize,
    /// Fail instead of dropping a final byte that is not NUL.
    pub strict_terminator: bool,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            max_field_len: crate::config::MAX_FIELD_LEN,
            strict_terminator: false,
        }
    }
}

/// A primitive field codec.
pub trait Codec {
    /// Decode the front of `buf` into `(bytes consumed, value)`.
    fn decode_with(&self, buf: &[u8], limits: &FieldLimits) -> Result<(usize, Value), CodecError>;

    /// Append the wire form of `value` to `dst`.
    fn encode_with(
        &self,
        value: &Value,
        dst: &mut BytesMut,
        limits: &FieldLimits,
    ) -> Result<(), CodecError>;

    /// Check a caller supplied value and bring it into canonical form.
    fn normalize(&self, value: Value) -> Result<Value, CodecError>;

    /// Value this codec decodes from an all-zero field.
    fn absent(&self) -> Value {
        Value::Absent
    }

    /// Character of this codec in a TDB_PACK format string.
    fn tdb_code(&self) -> char;

    fn decode(&self, buf: &[u8]) -> Result<(usize, Value), CodecError> {
        self.decode_with(buf, &FieldLimits::default())
    }

    fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<(), CodecError> {
        self.encode_with(value, dst, &FieldLimits::default())
    }

    /// Convenience wrapper returning a fresh buffer.
    fn encode_to_vec(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let mut dst = BytesMut::new();
        self.encode(value, &mut dst)?;
        Ok(dst.to_vec())
    }
}

fn take(buf: &[u8], len: usize) -> Result<&[u8], CodecError> {
    buf.get(..len).ok_or(CodecError::Truncated {
        needed: len,
        available: buf.len(),
    })
}

fn read_u32_le(buf: &[u8]) -> Result<u32, CodecError> {
    let raw = take(buf, 4)?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Read a length prefix and return the payload slice that follows it.
/// The needed count in a truncation error covers prefix and payload.
fn read_prefixed<'a>(buf: &'a [u8], limits: &FieldLimits) -> Result<&'a [u8], CodecError> {
    let len = read_u32_le(buf)? as usize;
    if len > limits.max_field_len {
        return Err(CodecError::FieldTooLarge {
            length: len,
            limit: limits.max_field_len,
        });
    }
    let rest = &buf[LENGTH_PREFIX..];
    if rest.len() < len {
        return Err(CodecError::Truncated {
            needed: LENGTH_PREFIX + len,
            available: buf.len(),
        });
    }
    Ok(&rest[..len])
}

/// Write a length prefix and payload, refusing anything the decoder would
/// reject under the same limits.
fn write_prefixed(
    payload: &[u8],
    terminate: bool,
    dst: &mut BytesMut,
    limits: &FieldLimits,
) -> Result<(), CodecError> {
    let len = payload.len() + usize::from(terminate);
    let limit = limits.max_field_len.min(u32::MAX as usize);
    if len > limit {
        return Err(CodecError::FieldTooLarge { length: len, limit });
    }
    let prefix = u32::try_from(len).map_err(|_| CodecError::FieldTooLarge { length: len, limit })?;
    dst.reserve(LENGTH_PREFIX + len);
    dst.put_u32_le(prefix);
    dst.put_slice(payload);
    if terminate {
        dst.put_u8(0);
    }
    Ok(())
}

fn mismatch(expected: &'static str, found: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

/// Unsigned 16-bit integer (`w`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Uint16;

impl Codec for Uint16 {
    fn decode_with(&self, buf: &[u8], _limits: &FieldLimits) -> Result<(usize, Value), CodecError> {
        let raw = take(buf, 2)?;
        Ok((2, Value::Uint(u32::from(u16::from_le_bytes([raw[0], raw[1]])))))
    }

    fn encode_with(
        &self,
        value: &Value,
        dst: &mut BytesMut,
        _limits: &FieldLimits,
    ) -> Result<(), CodecError> {
        let v = match value {
            Value::Absent => 0,
            Value::Uint(v) => {
                u16::try_from(*v).map_err(|_| CodecError::OutOfRange { value: *v, bits: 16 })?
            }
            other => return Err(mismatch("integer", other)),
        };
        dst.put_u16_le(v);
        Ok(())
    }

    fn normalize(&self, value: Value) -> Result<Value, CodecError> {
        match value {
            Value::Absent => Ok(Value::Absent),
            Value::Uint(v) if v <= u32::from(u16::MAX) => Ok(Value::Uint(v)),
            Value::Uint(v) => Err(CodecError::OutOfRange { value: v, bits: 16 }),
            other => Err(mismatch("integer", &other)),
        }
    }

    fn absent(&self) -> Value {
        Value::Uint(0)
    }

    fn tdb_code(&self) -> char {
        'w'
    }
}

/// Unsigned 32-bit integer (`d`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Uint32;

impl Codec for Uint32 {
    fn decode_with(&self, buf: &[u8], _limits: &FieldLimits) -> Result<(usize, Value), CodecError> {
        Ok((4, Value::Uint(read_u32_le(buf)?)))
    }

    fn encode_with(
        &self,
        value: &Value,
        dst: &mut BytesMut,
        _limits: &FieldLimits,
    ) -> Result<(), CodecError> {
        let v = match value {
            Value::Absent => 0,
            Value::Uint(v) => *v,
            other => return Err(mismatch("integer", other)),
        };
        dst.put_u32_le(v);
        Ok(())
    }

    fn normalize(&self, value: Value) -> Result<Value, CodecError> {
        match value {
            Value::Absent | Value::Uint(_) => Ok(value),
            other => Err(mismatch("integer", &other)),
        }
    }

    fn absent(&self) -> Value {
        Value::Uint(0)
    }

    fn tdb_code(&self) -> char {
        'd'
    }
}

/// Length-prefixed, NUL-terminated string (`B` holding a C string).
///
/// A length of one (terminator only) decodes to an empty [`Value::Text`],
/// which is distinct from [`Value::Absent`] and re-encodes to the same bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NulString;

impl Codec for NulString {
    fn decode_with(&self, buf: &[u8], limits: &FieldLimits) -> Result<(usize, Value), CodecError> {
        let payload = read_prefixed(buf, limits)?;
        let consumed = LENGTH_PREFIX + payload.len();
        let Some((&last, text)) = payload.split_last() else {
            return Ok((consumed, Value::Absent));
        };
        if last != 0 {
            if limits.strict_terminator {
                return Err(CodecError::MissingTerminator);
            }
            warn!(
                length = payload.len(),
                last_byte = last,
                "String payload not NUL-terminated, dropping final byte"
            );
        }
        Ok((consumed, Value::Text(text.to_vec())))
    }

    fn encode_with(
        &self,
        value: &Value,
        dst: &mut BytesMut,
        limits: &FieldLimits,
    ) -> Result<(), CodecError> {
        match value {
            Value::Absent => dst.put_u32_le(0),
            Value::Text(text) => write_prefixed(text, true, dst, limits)?,
            other => return Err(mismatch("string", other)),
        }
        Ok(())
    }

    fn normalize(&self, value: Value) -> Result<Value, CodecError> {
        match value {
            Value::Absent | Value::Text(_) => Ok(value),
            other => Err(mismatch("string", &other)),
        }
    }

    fn tdb_code(&self) -> char {
        'B'
    }
}

/// Length-prefixed raw bytes without a terminator (`B` holding a pointer).
#[derive(Debug, Clone, Copy, Default)]
pub struct Pointer;

impl Codec for Pointer {
    fn decode_with(&self, buf: &[u8], limits: &FieldLimits) -> Result<(usize, Value), CodecError> {
        let payload = read_prefixed(buf, limits)?;
        let value = if payload.is_empty() {
            Value::Absent
        } else {
            Value::Blob(payload.to_vec())
        };
        Ok((LENGTH_PREFIX + payload.len(), value))
    }

    fn encode_with(
        &self,
        value: &Value,
        dst: &mut BytesMut,
        limits: &FieldLimits,
    ) -> Result<(), CodecError> {
        match value {
            Value::Absent => dst.put_u32_le(0),
            Value::Blob(bytes) => write_prefixed(bytes, false, dst, limits)?,
            other => return Err(mismatch("blob", other)),
        }
        Ok(())
    }

    fn normalize(&self, value: Value) -> Result<Value, CodecError> {
        match value {
            Value::Absent => Ok(Value::Absent),
            // An empty blob is indistinguishable from absent on the wire.
            Value::Blob(bytes) if bytes.is_empty() => Ok(Value::Absent),
            Value::Blob(_) => Ok(value),
            other => Err(mismatch("blob", &other)),
        }
    }

    fn tdb_code(&self) -> char {
        'B'
    }
}

/// A [`Pointer`] whose payload callers see as uppercase hex text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexPassword;

impl Codec for HexPassword {
    fn decode_with(&self, buf: &[u8], limits: &FieldLimits) -> Result<(usize, Value), CodecError> {
        let (consumed, value) = Pointer.decode_with(buf, limits)?;
        let value = match value {
            Value::Blob(bytes) => Value::Hex(hex::encode_upper(bytes)),
            other => other,
        };
        Ok((consumed, value))
    }

    fn encode_with(
        &self,
        value: &Value,
        dst: &mut BytesMut,
        limits: &FieldLimits,
    ) -> Result<(), CodecError> {
        match value {
            Value::Absent => {
                dst.put_u32_le(0);
                Ok(())
            }
            Value::Hex(text) if text.is_empty() => {
                dst.put_u32_le(0);
                Ok(())
            }
            Value::Hex(text) => {
                let raw = hex::decode(text)?;
                write_prefixed(&raw, false, dst, limits)
            }
            other => Err(mismatch("hex password", other)),
        }
    }

    fn normalize(&self, value: Value) -> Result<Value, CodecError> {
        let text = match value {
            Value::Absent => return Ok(Value::Absent),
            Value::Hex(text) => text,
            Value::Text(ref bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => text.to_string(),
                Err(_) => return Err(mismatch("hex password", &value)),
            },
            other => return Err(mismatch("hex password", &other)),
        };
        if text.is_empty() {
            return Ok(Value::Absent);
        }
        hex::decode(&text)?;
        Ok(Value::hex(text))
    }

    fn tdb_code(&self) -> char {
        'B'
    }
}

/// Names one of the primitive codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    Uint16,
    Uint32,
    String,
    Pointer,
    Password,
}

impl CodecKind {
    fn codec(self) -> &'static dyn Codec {
        match self {
            CodecKind::Uint16 => &Uint16,
            CodecKind::Uint32 => &Uint32,
            CodecKind::String => &NulString,
            CodecKind::Pointer => &Pointer,
            CodecKind::Password => &HexPassword,
        }
    }

    /// Bytes this codec occupies when its value is absent.
    pub fn min_len(self) -> usize {
        match self {
            CodecKind::Uint16 => 2,
            CodecKind::Uint32 | CodecKind::String | CodecKind::Pointer | CodecKind::Password => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::Uint16 => "uint16",
            CodecKind::Uint32 => "uint32",
            CodecKind::String => "string",
            CodecKind::Pointer => "pointer",
            CodecKind::Password => "password",
        }
    }
}

impl Codec for CodecKind {
    fn decode_with(&self, buf: &[u8], limits: &FieldLimits) -> Result<(usize, Value), CodecError> {
        self.codec().decode_with(buf, limits)
    }

    fn encode_with(
        &self,
        value: &Value,
        dst: &mut BytesMut,
        limits: &FieldLimits,
    ) -> Result<(), CodecError> {
        self.codec().encode_with(value, dst, limits)
    }

    fn normalize(&self, value: Value) -> Result<Value, CodecError> {
        self.codec().normalize(value)
    }

    fn absent(&self) -> Value {
        self.codec().absent()
    }

    fn tdb_code(&self) -> char {
        self.codec().tdb_code()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn test_uint16_little_endian() {
        let (n, v) = Uint16.decode(&[0x34, 0x12, 0xff]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(v, Value::Uint(0x1234));
        assert_eq!(Uint16.encode_to_vec(&Value::Uint(0x1234)).unwrap(), vec![0x34, 0x12]);
    }

    #[test]
    fn test_uint16_rejects_wide_value() {
        let err = Uint16.encode_to_vec(&Value::Uint(0x1_0000)).unwrap_err();
        assert_eq!(err, CodecError::OutOfRange { value: 0x1_0000, bits: 16 });
        assert!(Uint16.normalize(Value::Uint(70_000)).is_err());
    }

    #[test]
    fn test_uint32_absent_encodes_zero() {
        assert_eq!(Uint32.encode_to_vec(&Value::Absent).unwrap(), vec![0; 4]);
        assert_eq!(Uint16.encode_to_vec(&Value::Absent).unwrap(), vec![0; 2]);
    }

    #[test]
    fn test_uint32_truncated() {
        let err = Uint32.decode(&[1, 2, 3]).unwrap_err();
        assert_eq!(err, CodecError::Truncated { needed: 4, available: 3 });
    }

    #[test]
    fn test_string_drops_terminator() {
        let buf = [4, 0, 0, 0, b'b', b'o', b'b', 0, 0xaa];
        let (n, v) = NulString.decode(&buf).unwrap();
        assert_eq!(n, 8);
        assert_eq!(v, Value::Text(b"bob".to_vec()));
    }

    #[test]
    fn test_string_encode_appends_one_nul() {
        let out = NulString.encode_to_vec(&Value::from("bob")).unwrap();
        assert_eq!(out, vec![4, 0, 0, 0, b'b', b'o', b'b', 0]);
    }

    #[test]
    fn test_string_zero_length_is_absent() {
        let (n, v) = NulString.decode(&[0, 0, 0, 0]).unwrap();
        assert_eq!(n, 4);
        assert_eq!(v, Value::Absent);
        assert_eq!(NulString.encode_to_vec(&v).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_string_terminator_only_is_empty_text() {
        let (n, v) = NulString.decode(&[1, 0, 0, 0, 0]).unwrap();
        assert_eq!(n, 5);
        assert_eq!(v, Value::Text(Vec::new()));
        assert_eq!(NulString.encode_to_vec(&v).unwrap(), vec![1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_string_missing_terminator() {
        let buf = [2, 0, 0, 0, b'a', b'b'];
        let (_, lenient) = NulString.decode(&buf).unwrap();
        assert_eq!(lenient, Value::Text(b"a".to_vec()));

        let strict = FieldLimits {
            strict_terminator: true,
            ..FieldLimits::default()
        };
        assert_eq!(
            NulString.decode_with(&buf, &strict).unwrap_err(),
            CodecError::MissingTerminator
        );
    }

    #[test]
    fn test_prefixed_payload_truncated() {
        let err = NulString.decode(&[10, 0, 0, 0, b'a']).unwrap_err();
        assert_eq!(err, CodecError::Truncated { needed: 14, available: 5 });
    }

    #[test]
    fn test_length_limit() {
        let limits = FieldLimits {
            max_field_len: 8,
            ..FieldLimits::default()
        };
        let mut buf = vec![9, 0, 0, 0];
        buf.extend_from_slice(&[0; 9]);
        let err = Pointer.decode_with(&buf, &limits).unwrap_err();
        assert_eq!(err, CodecError::FieldTooLarge { length: 9, limit: 8 });
    }

    #[test]
    fn test_length_limit_applies_to_encode() {
        let limits = FieldLimits {
            max_field_len: 8,
            ..FieldLimits::default()
        };
        let mut dst = BytesMut::new();

        Pointer.encode_with(&Value::Blob(vec![1; 8]), &mut dst, &limits).unwrap();
        let (_, decoded) = Pointer.decode_with(&dst, &limits).unwrap();
        assert_eq!(decoded, Value::Blob(vec![1; 8]));

        dst.clear();
        let err = Pointer
            .encode_with(&Value::Blob(vec![1; 9]), &mut dst, &limits)
            .unwrap_err();
        assert_eq!(err, CodecError::FieldTooLarge { length: 9, limit: 8 });
        assert!(dst.is_empty());

        // seven bytes of text plus the terminator is exactly the limit
        let text = Value::Text(vec![b'a'; 7]);
        NulString.encode_with(&text, &mut dst, &limits).unwrap();
        assert_eq!(NulString.decode_with(&dst, &limits).unwrap().1, text);
        let err = NulString
            .encode_with(&Value::Text(vec![b'a'; 8]), &mut dst, &limits)
            .unwrap_err();
        assert_eq!(err, CodecError::FieldTooLarge { length: 9, limit: 8 });

        // the limit counts raw password bytes, not hex characters
        dst.clear();
        HexPassword
            .encode_with(&Value::hex("00112233445566FF"), &mut dst, &limits)
            .unwrap();
        assert!(HexPassword
            .encode_with(&Value::hex("00112233445566FFEE"), &mut dst, &limits)
            .is_err());
    }

    #[test]
    fn test_pointer_keeps_trailing_zero() {
        let buf = [3, 0, 0, 0, 1, 2, 0];
        let (n, v) = Pointer.decode(&buf).unwrap();
        assert_eq!(n, 7);
        assert_eq!(v, Value::Blob(vec![1, 2, 0]));
        assert_eq!(Pointer.encode_to_vec(&v).unwrap(), buf.to_vec());
    }

    #[test]
    fn test_password_decodes_to_uppercase_hex() {
        let buf = [4, 0, 0, 0, 0xde, 0xad, 0xbe, 0xef];
        let (n, v) = HexPassword.decode(&buf).unwrap();
        assert_eq!(n, 8);
        assert_eq!(v, Value::Hex("DEADBEEF".to_string()));
    }

    #[test]
    fn test_password_encode_any_case() {
        let lower = HexPassword
            .encode_to_vec(&Value::Hex("deadbeef".to_string()))
            .unwrap();
        let upper = HexPassword
            .encode_to_vec(&Value::Hex("DEADBEEF".to_string()))
            .unwrap();
        assert_eq!(lower, vec![4, 0, 0, 0, 0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_password_odd_length_rejected() {
        let err = HexPassword
            .encode_to_vec(&Value::Hex("ABC".to_string()))
            .unwrap_err();
        assert_eq!(err, CodecError::MalformedHex(hex::FromHexError::OddLength));
    }

    #[test]
    fn test_password_non_hex_rejected() {
        let err = HexPassword.normalize(Value::from("zz")).unwrap_err();
        assert!(matches!(err, CodecError::MalformedHex(_)));
    }

    #[test]
    fn test_password_normalize_accepts_text() {
        let v = HexPassword.normalize(Value::from("00ff")).unwrap();
        assert_eq!(v, Value::Hex("00FF".to_string()));
    }

    #[test]
    fn test_type_mismatch() {
        let err = NulString.encode_to_vec(&Value::Uint(3)).unwrap_err();
        assert_eq!(
            err,
            CodecError::TypeMismatch {
                expected: "string",
                found: "integer"
            }
        );
    }

    #[test]
    fn test_kind_dispatch_and_codes() {
        let codes: String = [
            CodecKind::Uint32,
            CodecKind::Uint16,
            CodecKind::String,
            CodecKind::Pointer,
            CodecKind::Password,
        ]
        .iter()
        .map(|k| k.tdb_code())
        .collect();
        assert_eq!(codes, "dwBBB");
        assert_eq!(CodecKind::Uint16.absent(), Value::Uint(0));
        assert_eq!(CodecKind::Password.absent(), Value::Absent);
    }
}
