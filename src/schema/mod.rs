//! # Schema Registry
//!
//! Ordered field lists for the four historical passdb record layouts.
//!
//! Decoding is purely positional: a record carries no field tags, so a
//! [`Schema`] is nothing more than the order and codec of each field. The four
//! schemas are `static` values built at compile time and never mutated.
//!
//! ## Versions
//! | Version | Change from predecessor |
//! |---------|-------------------------|
//! | V0 | baseline layout |
//! | V1 | `bad_password_time` after `kickoff_time` |
//! | V2 | `nt_pw_hist` after `nt_pw`, `remove_me` dropped |
//! | V3 | `comment` replaces `unknown_str`, `acct_ctrl` widened to 32 bits |
//!
//! Which version applies to a given buffer is decided by the caller.

pub mod versions;

use crate::core::primitives::{Codec, CodecKind};
use crate::error::{PassdbError, Result};
use std::fmt;

/// One named, typed slot of a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub codec: CodecKind,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, codec: CodecKind) -> Self {
        Self { name, codec }
    }
}

/// An ordered record layout.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Schema {
    name: &'static str,
    version: Option<SchemaVersion>,
    fields: &'static [FieldDescriptor],
}

impl Schema {
    /// Build a layout outside the registry, mostly useful for tests.
    /// Field names must be unique.
    pub const fn custom(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self {
            name,
            version: None,
            fields,
        }
    }

    pub(crate) const fn versioned(
        name: &'static str,
        version: SchemaVersion,
        fields: &'static [FieldDescriptor],
    ) -> Self {
        Self {
            name,
            version: Some(version),
            fields,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registry version, `None` for custom layouts.
    pub fn version(&self) -> Option<SchemaVersion> {
        self.version
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of `name`; historical attribute names such as `nt_history`
    /// resolve to their current field.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let name = versions::canonical_name(name);
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        let fields: &'static [FieldDescriptor] = self.fields;
        self.index_of(name).and_then(|index| fields.get(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Like [`Schema::index_of`], failing with `UnknownField`.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| PassdbError::UnknownField(name.to_string()))
    }

    /// The TDB_PACK format string of this layout, e.g. `"ddddddBBBB..."`.
    pub fn tdb_format(&self) -> String {
        self.fields.iter().map(|f| f.codec.tdb_code()).collect()
    }

    /// Size of a record with every field absent.
    pub fn min_encoded_len(&self) -> usize {
        self.fields.iter().map(|f| f.codec.min_len()).sum()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.tdb_format())
    }
}

/// The four registered record layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaVersion {
    V0,
    V1,
    V2,
    V3,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 4] = [
        SchemaVersion::V0,
        SchemaVersion::V1,
        SchemaVersion::V2,
        SchemaVersion::V3,
    ];

    pub fn schema(self) -> &'static Schema {
        match self {
            SchemaVersion::V0 => &versions::PASSDB_V0,
            SchemaVersion::V1 => &versions::PASSDB_V1,
            SchemaVersion::V2 => &versions::PASSDB_V2,
            SchemaVersion::V3 => &versions::PASSDB_V3,
        }
    }

    pub fn number(self) -> u32 {
        match self {
            SchemaVersion::V0 => 0,
            SchemaVersion::V1 => 1,
            SchemaVersion::V2 => 2,
            SchemaVersion::V3 => 3,
        }
    }

    pub fn latest() -> Self {
        SchemaVersion::V3
    }
}

impl TryFrom<u32> for SchemaVersion {
    type Error = PassdbError;

    fn try_from(number: u32) -> Result<Self> {
        match number {
            0 => Ok(SchemaVersion::V0),
            1 => Ok(SchemaVersion::V1),
            2 => Ok(SchemaVersion::V2),
            3 => Ok(SchemaVersion::V3),
            other => Err(PassdbError::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.number())
    }
}
