//! Container layer for tracestore
//!
//! This crate implements the hierarchical container the engine writes into:
//! - [`Group`] / [`Dataset`] / [`Node`]: the in-memory tree
//! - [`Attribute`]: the native attribute type system
//! - [`ContainerFile`]: scoped file handle (open, flush, close)
//! - [`format`]: the on-disk image (magic, version, CRC32, bincode payload)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod file;
pub mod format;
pub mod node;

pub use error::{StorageError, StorageResult};
pub use file::{is_container_file, ContainerFile, OpenMode};
pub use format::{CONTAINER_FORMAT_VERSION, CONTAINER_MAGIC};
pub use node::{join_path, path_components, Attribute, Attributes, Dataset, Group, Node};
