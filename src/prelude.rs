//! Convenient imports for tracestore.
//!
//! ```ignore
//! use tracestore::prelude::*;
//!
//! let file = TraceFile::open("./day.trc", SessionConfig::default())?;
//! ```

// Session
pub use crate::config::{SessionConfig, SessionConfigBuilder};
pub use crate::session::TraceFile;

// Error handling
pub use crate::error::{Error, Result, Warning};

// Reading and writing
pub use crate::reader::{ReadOptions, StreamOutcome};
pub use crate::writer::{CollisionPolicy, WriteReport, WriteStatus};

// Core types
pub use crate::index::IndexTemplate;
pub use tracestore_core::{Metadata, MetadataValue, Samples, Timestamp, Trace};

// Streaming consumers return this
pub use std::ops::ControlFlow;
