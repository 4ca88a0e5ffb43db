//! JSON decoding for fallback metadata
//!
//! Implements decoding of JSON to MetadataValue, handling special wrappers:
//! - `$f64` for special floats (NaN, ±Inf, -0.0)
//! - `$ints` / `$floats` for rank-1 numeric arrays
//! - `$unserializable` sentinel, decoded to `MetadataValue::Opaque`
//!
//! Plain strings with the timestamp wire shape decode to timestamps.

use super::encode::{F64_WRAPPER, FLOATS_WRAPPER, INTS_WRAPPER, UNSERIALIZABLE_WRAPPER};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use thiserror::Error;
use tracestore_core::{parse_timestamp, MetadataValue, NumericArray};

/// Decode error types
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// Invalid JSON syntax
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Top-level blob is not a JSON object
    #[error("Fallback blob must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Invalid value in $f64 wrapper
    #[error("Invalid $f64 value: {0}")]
    InvalidF64Wrapper(String),

    /// Malformed $ints / $floats wrapper
    #[error("Invalid {wrapper} element: {element}")]
    InvalidArrayWrapper {
        /// Wrapper key
        wrapper: &'static str,
        /// Offending element, rendered as JSON
        element: String,
    },
}

/// Decode a fallback blob into its record of entries
pub fn decode_fallback(json: &str) -> Result<BTreeMap<String, MetadataValue>, DecodeError> {
    let parsed: Json =
        serde_json::from_str(json).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    match parsed {
        Json::Object(obj) => obj
            .iter()
            .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
            .collect(),
        other => Err(DecodeError::NotAnObject(json_kind(&other))),
    }
}

/// Decode one JSON tree to a MetadataValue
pub fn decode_value(json: &Json) -> Result<MetadataValue, DecodeError> {
    match json {
        Json::Null => Ok(MetadataValue::opaque("null")),
        Json::Bool(b) => Ok(MetadataValue::Int(*b as i64)),
        Json::Number(n) => Ok(match n.as_i64() {
            Some(i) => MetadataValue::Int(i),
            None => MetadataValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Json::String(s) => Ok(match parse_timestamp(s) {
            Some(t) => MetadataValue::Timestamp(t),
            None => MetadataValue::String(s.clone()),
        }),
        Json::Array(items) => items
            .iter()
            .map(decode_value)
            .collect::<Result<Vec<_>, _>>()
            .map(MetadataValue::List),
        Json::Object(obj) => decode_object_or_wrapper(obj),
    }
}

fn decode_object_or_wrapper(obj: &Map<String, Json>) -> Result<MetadataValue, DecodeError> {
    // Check for special wrappers (single-key objects with $ prefix)
    if obj.len() == 1 {
        if let Some(Json::String(tag)) = obj.get(F64_WRAPPER) {
            return decode_f64_wrapper(tag).map(MetadataValue::Float);
        }
        if let Some(Json::Array(items)) = obj.get(INTS_WRAPPER) {
            return decode_ints(items);
        }
        if let Some(Json::Array(items)) = obj.get(FLOATS_WRAPPER) {
            return decode_floats(items);
        }
        if let Some(Json::String(type_name)) = obj.get(UNSERIALIZABLE_WRAPPER) {
            return Ok(MetadataValue::opaque(type_name.clone()));
        }
    }

    obj.iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(MetadataValue::Map)
}

fn decode_ints(items: &[Json]) -> Result<MetadataValue, DecodeError> {
    items
        .iter()
        .map(|item| {
            item.as_i64().ok_or_else(|| DecodeError::InvalidArrayWrapper {
                wrapper: INTS_WRAPPER,
                element: item.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|v| MetadataValue::Array(NumericArray::Int(v)))
}

fn decode_floats(items: &[Json]) -> Result<MetadataValue, DecodeError> {
    items
        .iter()
        .map(|item| match item {
            Json::Number(n) => n.as_f64().ok_or_else(|| invalid_float(item)),
            Json::Object(obj) if obj.len() == 1 => match obj.get(F64_WRAPPER) {
                Some(Json::String(tag)) => decode_f64_wrapper(tag),
                _ => Err(invalid_float(item)),
            },
            _ => Err(invalid_float(item)),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|v| MetadataValue::Array(NumericArray::Float(v)))
}

fn invalid_float(item: &Json) -> DecodeError {
    DecodeError::InvalidArrayWrapper {
        wrapper: FLOATS_WRAPPER,
        element: item.to_string(),
    }
}

/// Decode $f64 wrapper (special floats)
fn decode_f64_wrapper(value: &str) -> Result<f64, DecodeError> {
    match value {
        "NaN" => Ok(f64::NAN),
        "+Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        "-0.0" => Ok(-0.0_f64),
        _ => Err(DecodeError::InvalidF64Wrapper(value.to_string())),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
