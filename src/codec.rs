//! Attribute codec
//!
//! Maps metadata values onto the container's native attribute types and back.
//!
//! Encoding rules, first match wins:
//!
//! | Value | Stored as |
//! |-------|-----------|
//! | Timestamp, years 0000..=9999 | byte string in the 27-character wire form |
//! | Int / Float | native number |
//! | String | byte string |
//! | Rank-1 numeric array | native array |
//! | Map / List | entry in the `_json` fallback blob |
//! | anything else | dropped with a warning |
//!
//! Decoding turns byte strings back into text, recognizes timestamp-shaped
//! text and merges the fallback blob over the native attributes.

use crate::error::Warning;
use std::collections::BTreeSet;
use tracestore_core::{
    format_timestamp, is_timestamp_shaped, parse_timestamp, Metadata, MetadataValue, NumericArray,
};
use tracestore_storage::{Attribute, Attributes};
use tracestore_wire::{decode_fallback, encode_fallback};

/// Reserved attribute holding the JSON fallback blob
pub const FALLBACK_KEY: &str = "_json";

/// Result of encoding one metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// Stored as a native attribute
    Native(Attribute),
    /// Routed to the fallback blob
    Fallback(MetadataValue),
    /// Not storable; the field is dropped
    Dropped(Warning),
}

/// Encode a single value
pub fn encode(key: &str, value: &MetadataValue) -> Encoded {
    match value {
        MetadataValue::Timestamp(t) => match format_timestamp(t) {
            Some(wire) => Encoded::Native(Attribute::Bytes(wire.into_bytes())),
            None => Encoded::Dropped(Warning::UnsupportedValue {
                key: key.to_string(),
                type_name: value.type_name().to_string(),
            }),
        },
        MetadataValue::Int(i) => Encoded::Native(Attribute::Int(*i)),
        MetadataValue::Float(f) => Encoded::Native(Attribute::Float(*f)),
        MetadataValue::String(s) => Encoded::Native(Attribute::Bytes(s.as_bytes().to_vec())),
        MetadataValue::Array(NumericArray::Int(v)) => Encoded::Native(Attribute::IntArray(v.clone())),
        MetadataValue::Array(NumericArray::Float(v)) => Encoded::Native(Attribute::FloatArray(v.clone())),
        MetadataValue::Map(_) | MetadataValue::List(_) => Encoded::Fallback(value.clone()),
        MetadataValue::Opaque { type_name } => Encoded::Dropped(Warning::UnsupportedValue {
            key: key.to_string(),
            type_name: type_name.clone(),
        }),
    }
}

/// Attributes produced for one trace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedAttributes {
    /// Native attributes, including the fallback blob when present
    pub native: Attributes,
    /// Keys routed through the fallback blob
    pub fallback: BTreeSet<String>,
    /// Value-level problems encountered while encoding
    pub warnings: Vec<Warning>,
}

/// Encode a whole metadata record, skipping `ignore`d keys
pub fn encode_metadata(metadata: &Metadata, ignore: &BTreeSet<String>) -> EncodedAttributes {
    let mut out = EncodedAttributes::default();
    let mut fallback = Metadata::new();

    for (key, value) in metadata {
        if ignore.contains(key) {
            continue;
        }
        if key == FALLBACK_KEY {
            out.warnings.push(Warning::ReservedKey { key: key.clone() });
            continue;
        }
        match encode(key, value) {
            Encoded::Native(attr) => {
                out.native.insert(key.clone(), attr);
            }
            Encoded::Fallback(value) => {
                fallback.insert(key.clone(), value);
            }
            Encoded::Dropped(warning) => out.warnings.push(warning),
        }
    }

    if !fallback.is_empty() {
        let blob = encode_fallback(&fallback);
        out.warnings.extend(
            blob.unserializable
                .into_iter()
                .map(|key_path| Warning::NotSerializable { key_path }),
        );
        out.native
            .insert(FALLBACK_KEY.to_string(), Attribute::Text(blob.json));
        out.fallback = fallback.into_keys().collect();
    }
    out
}

/// Decode one native attribute
pub fn decode_attribute(attr: &Attribute) -> MetadataValue {
    match attr {
        Attribute::Int(i) => MetadataValue::Int(*i),
        Attribute::Float(f) => MetadataValue::Float(*f),
        Attribute::IntArray(v) => MetadataValue::Array(NumericArray::Int(v.clone())),
        Attribute::FloatArray(v) => MetadataValue::Array(NumericArray::Float(v.clone())),
        Attribute::Bytes(_) | Attribute::Text(_) => {
            let text = attr.as_text().unwrap_or_default();
            match is_timestamp_shaped(&text).then(|| parse_timestamp(&text)).flatten() {
                Some(t) => MetadataValue::Timestamp(t),
                None => MetadataValue::String(text),
            }
        }
    }
}

/// Decode a dataset's attributes back into metadata
///
/// Fields from the fallback blob take precedence over native attributes of
/// the same name. A blob that cannot be parsed is skipped with a warning.
pub fn decode(attrs: &Attributes) -> (Metadata, Vec<Warning>) {
    let mut metadata = Metadata::new();
    let mut warnings = Vec::new();

    for (key, attr) in attrs {
        if key != FALLBACK_KEY {
            metadata.insert(key.clone(), decode_attribute(attr));
        }
    }

    if let Some(blob) = attrs.get(FALLBACK_KEY) {
        let parsed = match blob.as_text() {
            Some(json) => decode_fallback(&json).map_err(|e| e.to_string()),
            None => Err(format!("expected text, found {:?}", blob)),
        };
        match parsed {
            Ok(fields) => metadata.extend(fields),
            Err(reason) => warnings.push(Warning::MalformedFallback { reason }),
        }
    }
    (metadata, warnings)
}
