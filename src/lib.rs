//! # passdb-codec
//!
//! Decoder and encoder for the user-account records stored in passdb tdb
//! files, in all four historical layouts of the TDB_PACK record format.
//!
//! The crate works on raw record buffers. Reading the database file, looking
//! entries up by name and choosing the layout version are the caller's job.
//!
//! ## Quick Start
//! ```rust
//! use passdb_codec::{Record, SchemaVersion};
//!
//! let schema = SchemaVersion::V2.schema();
//! let mut record = Record::new(schema);
//! record.set("username", "erin")?;
//! record.set("user_rid", 1003u32)?;
//!
//! let buffer = record.encode()?;
//! let decoded = Record::decode(schema, &buffer)?;
//! assert_eq!(decoded.get_u32("user_rid"), Some(1003));
//! # Ok::<(), passdb_codec::PassdbError>(())
//! ```
//!
//! ## Modules
//! - [`core`]: primitive codecs, values, records, export formats
//! - [`schema`]: field descriptors and the V0-V3 layouts
//! - [`config`]: codec and logging configuration
//! - [`error`]: error types
//! - [`utils`]: logging setup and metrics

pub mod config;
pub mod core;
pub mod error;
pub mod schema;
pub mod utils;

pub use crate::config::{CodecConfig, PassdbConfig};
pub use crate::core::primitives::{Codec, CodecKind};
pub use crate::core::record::{decode, encode, Record, RecordCodec};
pub use crate::core::value::Value;
pub use crate::error::{PassdbError, Result};
pub use crate::schema::versions::acct_flags;
pub use crate::schema::{FieldDescriptor, Schema, SchemaVersion};
