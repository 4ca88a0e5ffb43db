//! JSON encoding for fallback metadata
//!
//! Implements encoding of MetadataValue to JSON with special wrappers:
//! - `$f64` for special floats (NaN, ±Inf, -0.0)
//! - `$ints` / `$floats` for rank-1 numeric arrays
//! - `$unserializable` sentinel for opaque values and timestamps without a
//!   wire form

use serde_json::{json, Map, Number, Value as Json};
use std::collections::BTreeMap;
use tracestore_core::{format_timestamp, MetadataValue, NumericArray};

/// Wrapper key for special floats
pub const F64_WRAPPER: &str = "$f64";
/// Wrapper key for integer arrays
pub const INTS_WRAPPER: &str = "$ints";
/// Wrapper key for float arrays
pub const FLOATS_WRAPPER: &str = "$floats";
/// Sentinel key for values that could not be represented
pub const UNSERIALIZABLE_WRAPPER: &str = "$unserializable";

/// Result of encoding a set of fallback entries
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackBlob {
    /// Serialized JSON object
    pub json: String,
    /// Dotted key paths that were replaced by the sentinel
    pub unserializable: Vec<String>,
}

impl FallbackBlob {
    /// True if every value was represented faithfully
    pub fn is_lossless(&self) -> bool {
        self.unserializable.is_empty()
    }
}

/// Encode a record of fallback entries into one JSON object
///
/// Never fails: values with no JSON form are replaced by
/// `{"$unserializable": "<type>"}` and their key paths reported.
pub fn encode_fallback(entries: &BTreeMap<String, MetadataValue>) -> FallbackBlob {
    let mut unserializable = Vec::new();
    let mut obj = Map::new();
    for (key, value) in entries {
        obj.insert(key.clone(), encode_value(value, key, &mut unserializable));
    }
    FallbackBlob {
        json: Json::Object(obj).to_string(),
        unserializable,
    }
}

/// Encode a single value to a JSON tree
///
/// `path` names the value in diagnostics; sentinel substitutions are pushed
/// onto `unserializable`.
pub fn encode_value(value: &MetadataValue, path: &str, unserializable: &mut Vec<String>) -> Json {
    match value {
        MetadataValue::Int(i) => Json::from(*i),
        MetadataValue::Float(f) => encode_float(*f),
        MetadataValue::String(s) => Json::String(s.clone()),
        MetadataValue::Timestamp(t) => match format_timestamp(t) {
            Some(wire) => Json::String(wire),
            None => {
                unserializable.push(path.to_string());
                json!({ UNSERIALIZABLE_WRAPPER: value.type_name() })
            }
        },
        MetadataValue::Array(NumericArray::Int(v)) => json!({ INTS_WRAPPER: v }),
        MetadataValue::Array(NumericArray::Float(v)) => {
            let elements: Vec<Json> = v.iter().map(|f| encode_float(*f)).collect();
            json!({ FLOATS_WRAPPER: elements })
        }
        MetadataValue::Map(map) => {
            let mut obj = Map::new();
            for (k, v) in map {
                let child = format!("{}.{}", path, k);
                obj.insert(k.clone(), encode_value(v, &child, unserializable));
            }
            Json::Object(obj)
        }
        MetadataValue::List(items) => Json::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| encode_value(v, &format!("{}[{}]", path, i), unserializable))
                .collect(),
        ),
        MetadataValue::Opaque { type_name } => {
            unserializable.push(path.to_string());
            json!({ UNSERIALIZABLE_WRAPPER: type_name })
        }
    }
}

/// Encode a float, using $f64 wrapper for special values
fn encode_float(f: f64) -> Json {
    if f.is_nan() {
        json!({ F64_WRAPPER: "NaN" })
    } else if f == f64::INFINITY {
        json!({ F64_WRAPPER: "+Inf" })
    } else if f == f64::NEG_INFINITY {
        json!({ F64_WRAPPER: "-Inf" })
    } else if f.to_bits() == (-0.0_f64).to_bits() {
        json!({ F64_WRAPPER: "-0.0" })
    } else {
        // from_f64 only rejects non-finite values, handled above
        Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null)
    }
}
