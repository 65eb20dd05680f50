//! # Core Transcoding Components
//!
//! Primitive codecs, the value model, and the schema-driven record codec.
//!
//! ## Components
//! - **Value**: decoded field values with an explicit absent marker
//! - **Primitives**: fixed-width integers, NUL-terminated strings, raw pointers, hex passwords
//! - **Record**: ordered decode/encode of a whole passdb entry
//! - **Serialization**: JSON and bincode export of decoded records
//!
//! ## Wire Format
//! ```text
//! [field 0] [field 1] ... [field N]      no tags, no padding, little-endian
//! ```

pub mod primitives;
pub mod record;
pub mod serialization;
pub mod value;
