//! # tracestore
//!
//! Hierarchical storage for time-series segments ("traces").
//!
//! Each trace is a typed sample array plus a metadata record. Traces are
//! stored in a single container file at a path rendered from an index
//! template, and their metadata is encoded into the container's native
//! attribute types with a JSON fallback for nested values.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tracestore::prelude::*;
//!
//! let config = SessionConfig::builder()
//!     .index_template("standard")
//!     .policy("raise")
//!     .build()?;
//!
//! let mut file = TraceFile::create("./day.trc", config.clone())?;
//! file.write(&traces)?;
//! file.close()?;
//!
//! let file = TraceFile::open("./day.trc", config)?;
//! let traces = file.read(&ReadOptions::new());
//! ```
//!
//! ## Components
//!
//! - [`index`]: path templates and derived fields
//! - [`codec`]: metadata to attribute encoding and back
//! - [`writer`]: trace placement and collision policies
//! - [`reader`]: depth-first traversal, filtered and streaming reads
//! - [`header`]: root-level file markers
//! - [`TraceFile`]: a session over one open file

#![warn(missing_docs)]

pub mod codec;
mod config;
mod error;
pub mod header;
pub mod index;
pub mod reader;
mod session;
pub mod writer;

pub mod prelude;

// Re-export main entry points
pub use config::{SessionConfig, SessionConfigBuilder, DEFAULT_GROUP};
pub use error::{Error, Result, Warning};
pub use header::{is_trace_file, FileHeader};
pub use index::{DerivedFields, IndexTemplate};
pub use reader::{ReadOptions, StreamOutcome, TraceEntry, Traversal};
pub use session::{SessionMode, TraceFile};
pub use writer::{CollisionPolicy, IgnoreSet, WriteOutcome, WriteReport, WriteStatus};

// Re-export data types
pub use tracestore_core::{Metadata, MetadataValue, NumericArray, Samples, Timestamp, Trace};
