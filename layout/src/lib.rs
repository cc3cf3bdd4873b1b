//! Describe binary layouts with composable field types.
//!
//! # Overview
//!
//! A declarative serialization library: a layout is built once out of field types, then used
//! to read values from bytes, write values to bytes, and validate values without touching
//! bytes at all. Every field type implements [`FieldType`]:
//! - `read` decodes from a bounds-checked [`Cursor`], advancing it by exactly the bytes consumed
//! - `write` appends to a chunked [`Sink`], which supports patching placeholders in place
//! - `validate` checks a value against the constraints of the field
//!
//! # Supported Types
//!
//! - Primitives: 8 to 64-bit integers and 32/64-bit floats, with explicit endianness
//! - Bytes and UTF-8 strings: fixed-length, length-prefixed, and null-terminated
//! - Logical: `Bool`, string and number enums, literals, optional values
//! - Combinators: arrays, tuples, structs, tagged unions, and forward references
//!
//! Structs and unions carry runtime-shaped data as a [`Value`]. Statically typed fields join
//! them through [`Dynamic`], and [`FieldTypeExt::map`] adapts any field to a new value type.
//!
//! # Example
//!
//! ```
//! use commonware_layout::{
//!     types::{
//!         array::length_prefixed_array,
//!         logical::{optional, Bool},
//!         primitives::{Uint16BE, Uint8},
//!         string::NullTerminatedString,
//!         structure::Struct,
//!     },
//!     FieldTypeExt, Record, Value,
//! };
//!
//! let header = Struct::new()
//!     .field("version", Uint8)
//!     .field("name", NullTerminatedString)
//!     .field("port", optional(Uint16BE))
//!     .field("flags", length_prefixed_array(Uint8, Bool));
//!
//! let mut value = Record::new();
//! value.insert("version".into(), Value::Int(1));
//! value.insert("name".into(), "node".into());
//! value.insert("port".into(), Value::Option(Some(Box::new(Value::Int(8080)))));
//! value.insert("flags".into(), Value::List(vec![true.into(), false.into()]));
//!
//! let encoded = header.encode(&value).unwrap();
//! assert_eq!(
//!     encoded.as_ref(),
//!     &[1, b'n', b'o', b'd', b'e', 0, 1, 0x1f, 0x90, 2, 1, 0]
//! );
//! assert_eq!(header.decode(&encoded).unwrap(), value);
//! ```
//!
//! # Example (Typed)
//!
//! Fields that do not need runtime shapes keep native Rust values end to end.
//!
//! ```
//! use commonware_layout::{
//!     types::{primitives::{Float32LE, Uint32LE}, string::length_prefixed_string},
//!     Error, FieldTypeExt,
//! };
//!
//! let point = (Uint32LE, Float32LE, length_prefixed_string(Uint32LE).with_range(..=64));
//! let encoded = point.encode(&(7, 1.5, "label".to_string())).unwrap();
//! assert_eq!(encoded.len(), 4 + 4 + 4 + 5);
//! assert_eq!(point.decode(&encoded).unwrap().2, "label");
//!
//! // Trailing bytes are rejected
//! let mut padded = encoded.to_vec();
//! padded.push(0);
//! assert_eq!(point.decode(&padded), Err(Error::ExtraData(1)));
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod field;
pub mod sink;
pub mod types;
pub mod value;

// Re-export main types and traits
pub use config::RangeCfg;
pub use cursor::Cursor;
pub use error::Error;
pub use field::{BoxedField, FieldType, FieldTypeExt};
pub use sink::{Checkpoint, Sink};
pub use types::primitives;
pub use value::{Dynamic, Record, Value};
