//! Metadata value types for tracestore
//!
//! Trace metadata is a string-keyed record of heterogeneous values. The
//! [`MetadataValue`] enum is the closed set of shapes the engine understands;
//! the attribute codec switches on these variants rather than sniffing
//! runtime types.
//!
//! ## The Eight Shapes
//!
//! 1. `Int` - 64-bit signed integer
//! 2. `Float` - 64-bit IEEE-754 floating point
//! 3. `String` - UTF-8 text
//! 4. `Timestamp` - UTC instant, microsecond precision on the wire
//! 5. `Array` - rank-1 numeric array
//! 6. `Map` - nested string-keyed record
//! 7. `List` - ordered sequence of values
//! 8. `Opaque` - a value the caller could not express in the other shapes
//!
//! Only the first five can be stored as native container attributes. Maps and
//! lists go through the JSON fallback channel; opaque values are dropped (or
//! replaced by a sentinel inside the fallback blob).

use crate::timestamp::Timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A trace metadata record, ordered by key
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Rank-1 numeric array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NumericArray {
    /// 64-bit signed integers
    Int(Vec<i64>),
    /// 64-bit floats
    Float(Vec<f64>),
}

impl NumericArray {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            NumericArray::Int(v) => v.len(),
            NumericArray::Float(v) => v.len(),
        }
    }

    /// True if the array holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    /// 64-bit signed integer
    Int(i64),

    /// 64-bit IEEE-754 floating point
    Float(f64),

    /// UTF-8 text
    String(String),

    /// UTC instant
    Timestamp(Timestamp),

    /// Rank-1 numeric array
    Array(NumericArray),

    /// Nested record
    Map(BTreeMap<String, MetadataValue>),

    /// Ordered sequence (lists and tuples alike)
    List(Vec<MetadataValue>),

    /// Value with no representation in the other variants
    ///
    /// Carries only the name of the original type, for diagnostics.
    Opaque {
        /// Name of the type the value came from
        type_name: String,
    },
}

impl MetadataValue {
    /// Returns the type name as a string (for warnings and error messages)
    pub fn type_name(&self) -> &str {
        match self {
            MetadataValue::Int(_) => "Int",
            MetadataValue::Float(_) => "Float",
            MetadataValue::String(_) => "String",
            MetadataValue::Timestamp(_) => "Timestamp",
            MetadataValue::Array(NumericArray::Int(_)) => "IntArray",
            MetadataValue::Array(NumericArray::Float(_)) => "FloatArray",
            MetadataValue::Map(_) => "Map",
            MetadataValue::List(_) => "List",
            MetadataValue::Opaque { type_name } => type_name,
        }
    }

    /// Build an opaque value
    pub fn opaque(type_name: impl Into<String>) -> Self {
        MetadataValue::Opaque {
            type_name: type_name.into(),
        }
    }

    /// True for maps and lists, the shapes that need the fallback channel
    pub fn is_compound(&self) -> bool {
        matches!(self, MetadataValue::Map(_) | MetadataValue::List(_))
    }

    /// Try to get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetadataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64
    ///
    /// Integers widen; nothing else converts.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(f) => Some(*f),
            MetadataValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as timestamp
    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            MetadataValue::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    /// Try to get as nested record
    pub fn as_map(&self) -> Option<&BTreeMap<String, MetadataValue>> {
        match self {
            MetadataValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int(v)
    }
}

impl From<i32> for MetadataValue {
    fn from(v: i32) -> Self {
        MetadataValue::Int(v as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::String(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::String(v)
    }
}

impl From<Timestamp> for MetadataValue {
    fn from(v: Timestamp) -> Self {
        MetadataValue::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for MetadataValue {
    fn from(v: DateTime<Utc>) -> Self {
        MetadataValue::Timestamp(Timestamp::from(v))
    }
}

impl From<Vec<i64>> for MetadataValue {
    fn from(v: Vec<i64>) -> Self {
        MetadataValue::Array(NumericArray::Int(v))
    }
}

impl From<Vec<f64>> for MetadataValue {
    fn from(v: Vec<f64>) -> Self {
        MetadataValue::Array(NumericArray::Float(v))
    }
}

impl From<BTreeMap<String, MetadataValue>> for MetadataValue {
    fn from(v: BTreeMap<String, MetadataValue>) -> Self {
        MetadataValue::Map(v)
    }
}

impl From<Vec<MetadataValue>> for MetadataValue {
    fn from(v: Vec<MetadataValue>) -> Self {
        MetadataValue::List(v)
    }
}
