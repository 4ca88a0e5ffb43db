//! Core types for tracestore
//!
//! This crate defines the plain data the engine consumes and produces:
//! - [`MetadataValue`] / [`Metadata`]: heterogeneous trace metadata
//! - [`Samples`] / [`Trace`]: typed sample payload plus metadata
//! - [`timestamp`]: the fixed-width timestamp wire form

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod timestamp;
pub mod trace;
pub mod value;

pub use timestamp::{format_timestamp, is_timestamp_shaped, parse_timestamp, Timestamp};
pub use trace::{Samples, Trace};
pub use value::{Metadata, MetadataValue, NumericArray};
