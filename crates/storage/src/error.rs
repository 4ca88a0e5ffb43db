//! Error types for the container layer

use thiserror::Error;

/// Container errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with the container magic
    #[error("not a container file: bad magic")]
    BadMagic,

    /// Container format version this build cannot read
    #[error("unsupported container format version {version}")]
    UnsupportedVersion {
        /// Version found in the file header
        version: u32,
    },

    /// Payload checksum does not match the header
    #[error("checksum mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum recorded in the header
        expected: u32,
        /// Checksum computed over the payload
        actual: u32,
    },

    /// File shorter than its header claims
    #[error("truncated container: need {needed} bytes, have {have}")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes available
        have: usize,
    },

    /// Tree (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A path component names a dataset where a group is required
    #[error("'{path}' is a dataset, not a group")]
    NotAGroup {
        /// Offending path
        path: String,
    },

    /// Nothing exists at the path
    #[error("no node at '{path}'")]
    NotFound {
        /// Requested path
        path: String,
    },

    /// A node already exists at the path
    #[error("node already exists at '{path}'")]
    AlreadyExists {
        /// Requested path
        path: String,
    },

    /// Path is empty or otherwise unusable
    #[error("invalid path '{path}'")]
    InvalidPath {
        /// Requested path
        path: String,
    },

    /// Mutation attempted on a read-only handle
    #[error("container '{path}' is open read-only")]
    ReadOnly {
        /// File path
        path: String,
    },
}

impl From<bincode::Error> for StorageError {
    fn from(e: bincode::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for container operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;
