//! Wire encoding for tracestore
//!
//! This crate implements the JSON fallback channel for metadata values the
//! container cannot store as native attributes.
//!
//! ## Wire Encoding Rules
//!
//! | Value Shape | JSON Encoding |
//! |-------------|---------------|
//! | Int | number |
//! | Float (normal) | number |
//! | Float (special) | `{"$f64": "..."}` |
//! | String | `"..."` |
//! | Timestamp | `"YYYY-MM-DDTHH:MM:SS.ffffffZ"` |
//! | Timestamp past year 9999 or before 0000 | `{"$unserializable": "Timestamp"}` |
//! | Int array | `{"$ints": [...]}` |
//! | Float array | `{"$floats": [...]}` |
//! | List | `[...]` |
//! | Map | `{...}` |
//! | Opaque | `{"$unserializable": "<type>"}` |
//!
//! ## Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use tracestore_core::MetadataValue;
//! use tracestore_wire::{decode_fallback, encode_fallback};
//!
//! let mut entries = BTreeMap::new();
//! entries.insert("count".to_string(), MetadataValue::Int(5));
//! let blob = encode_fallback(&entries);
//! assert_eq!(blob.json, r#"{"count":5}"#);
//!
//! let decoded = decode_fallback(&blob.json).unwrap();
//! assert_eq!(decoded, entries);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod json;

// Re-export main types
pub use json::{decode_fallback, decode_value, encode_fallback, encode_value, DecodeError, FallbackBlob};
