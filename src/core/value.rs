//! # Field Values
//!
//! The in-memory representation of a single decoded passdb field.
//!
//! Every codec family maps onto one variant, and every family shares the
//! [`Value::Absent`] marker for "present in the schema but holding no data".
//! Strings are kept as raw bytes because the unix charset of a passdb file is
//! not guaranteed to be UTF-8; [`Value::as_str`] offers a checked view.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// No data. Encodes as a zero integer or a zero length prefix.
    #[default]
    Absent,
    /// Unsigned integer of a 16 or 32 bit field.
    Uint(u32),
    /// String payload with the NUL terminator stripped.
    #[serde(with = "text_serde")]
    Text(Vec<u8>),
    /// Raw, unterminated payload.
    Blob(Vec<u8>),
    /// Password bytes as uppercase hexadecimal text.
    Hex(String),
}

impl Value {
    /// Build a password value, normalizing the text to uppercase.
    pub fn hex(text: impl AsRef<str>) -> Self {
        Value::Hex(text.as_ref().to_ascii_uppercase())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Raw payload of a string or blob value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(bytes) | Value::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// UTF-8 view of a string value, `None` for other kinds or invalid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    /// Lossy text view, for logging and display.
    pub fn to_text_lossy(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Text(bytes) => Some(String::from_utf8_lossy(bytes)),
            _ => None,
        }
    }

    pub fn as_hex(&self) -> Option<&str> {
        match self {
            Value::Hex(text) => Some(text),
            _ => None,
        }
    }

    /// Short kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Uint(_) => "integer",
            Value::Text(_) => "string",
            Value::Blob(_) => "blob",
            Value::Hex(_) => "hex password",
        }
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Uint(u32::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Blob(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Blob(bytes.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Absent, Into::into)
    }
}

/// Text payloads in export formats.
///
/// Binary formats carry the raw bytes. Human-readable formats write a string
/// when the payload is UTF-8 and a byte array otherwise, so unix-charset data
/// survives a dump and reload unchanged.
mod text_serde {
    use serde::de::{self, SeqAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if !serializer.is_human_readable() {
            return serializer.serialize_bytes(bytes);
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.collect_seq(bytes),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(TextVisitor)
        } else {
            deserializer.deserialize_byte_buf(TextVisitor)
        }
    }

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or an array of bytes")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Vec<u8>, E> {
            Ok(v.as_bytes().to_vec())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Vec<u8>, E> {
            Ok(v.into_bytes())
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Vec<u8>, E> {
            Ok(v.to_vec())
        }

        fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Vec<u8>, E> {
            Ok(v)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<u8>, A::Error> {
            let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
            while let Some(byte) = seq.next_element::<u8>()? {
                bytes.push(byte);
            }
            Ok(bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(7u16), Value::Uint(7));
        assert_eq!(Value::from("bob"), Value::Text(b"bob".to_vec()));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Blob(vec![1, 2]));
        assert_eq!(Value::from(None::<u32>), Value::Absent);
        assert_eq!(Value::from(Some("x")), Value::Text(b"x".to_vec()));
    }

    #[test]
    fn test_hex_constructor_uppercases() {
        assert_eq!(Value::hex("deadBEEF"), Value::Hex("DEADBEEF".to_string()));
    }

    #[test]
    fn test_as_str_rejects_invalid_utf8() {
        let v = Value::Text(vec![0xff, 0xfe]);
        assert!(v.as_str().is_none());
        assert_eq!(v.as_bytes(), Some(&[0xff, 0xfe][..]));
        assert!(v.to_text_lossy().is_some());
    }

    #[test]
    fn test_text_json_form() {
        let utf8 = serde_json::to_value(Value::from("Jér")).unwrap_or_default();
        assert_eq!(utf8, serde_json::json!({ "text": "Jér" }));

        let latin1 = Value::Text(vec![b'J', 0xE9, b'r']);
        let raw = serde_json::to_value(&latin1).unwrap_or_default();
        assert_eq!(raw, serde_json::json!({ "text": [74, 233, 114] }));
        assert_eq!(serde_json::from_value::<Value>(raw).ok(), Some(latin1));
    }

    #[test]
    fn test_default_is_absent() {
        assert!(Value::default().is_absent());
        assert_eq!(Value::Absent.kind(), "absent");
    }
}
