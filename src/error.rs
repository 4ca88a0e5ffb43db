//! Unified error types for tracestore.
//!
//! Two channels exist:
//! - [`Error`]: structural failures that abort the current operation
//!   (missing template field, duplicate index under `raise`, bad policy,
//!   header-only rewrite without a dataset).
//! - [`Warning`]: value-level problems recovered locally. Writes return them
//!   in their report and log them through `tracing`.

use thiserror::Error;
use tracestore_storage::StorageError;

/// All tracestore errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A template placeholder has no corresponding metadata entry
    #[error("missing field '{field}' required by index template '{template}'")]
    MissingField {
        /// Placeholder name
        field: String,
        /// Template being rendered
        template: String,
    },

    /// A node already exists at the rendered path under the `raise` policy
    #[error("index '{path}' already exists")]
    DuplicateIndex {
        /// Rendered path
        path: String,
    },

    /// Unrecognized collision policy
    #[error("invalid collision policy '{value}': expected one of warn, raise, ignore, skip")]
    InvalidPolicy {
        /// Value supplied by the caller
        value: String,
    },

    /// Header-only rewrite of a path that holds no dataset
    #[error("header-only write needs an existing dataset at '{path}'")]
    HeadonlyMissingDataset {
        /// Rendered path
        path: String,
    },

    /// Template cannot be parsed or a field cannot be rendered into a path
    #[error("invalid index template '{template}': {reason}")]
    InvalidTemplate {
        /// Template text
        template: String,
        /// What went wrong
        reason: String,
    },

    /// Operation not allowed in the session's open mode
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// Write attempted on a read-only session
    #[error("file '{path}' is open read-only")]
    ReadOnly {
        /// File path
        path: String,
    },

    /// Ordinal outside the materialized trace ordering
    #[error("trace ordinal {index} out of range (file holds {len} traces)")]
    IndexOutOfRange {
        /// Requested ordinal
        index: usize,
        /// Number of traces
        len: usize,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Container error
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tracestore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for failures caused by the trace's own metadata
    ///
    /// Callers writing a batch may choose to skip such traces and continue.
    pub fn is_trace_level(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. } | Error::DuplicateIndex { .. } | Error::HeadonlyMissingDataset { .. }
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Non-fatal diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An existing node was replaced under the `warn` policy
    Override {
        /// Rendered path
        path: String,
    },

    /// A metadata value fits neither native storage nor the fallback blob;
    /// the field was dropped
    UnsupportedValue {
        /// Metadata key
        key: String,
        /// Type of the dropped value
        type_name: String,
    },

    /// A value inside the fallback blob was replaced by the sentinel
    NotSerializable {
        /// Dotted key path inside the blob
        key_path: String,
    },

    /// A metadata key collides with the reserved fallback attribute
    ReservedKey {
        /// Metadata key
        key: String,
    },

    /// A stored fallback blob could not be parsed and was ignored
    MalformedFallback {
        /// Parser message
        reason: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::Override { path } => write!(f, "index '{}' already exists, overriding trace", path),
            Warning::UnsupportedValue { key, type_name } => write!(
                f,
                "writing header '{}' is not supported (type {}), field dropped",
                key, type_name
            ),
            Warning::NotSerializable { key_path } => {
                write!(f, "header '{}' is not serializable, stored as sentinel", key_path)
            }
            Warning::ReservedKey { key } => {
                write!(f, "header '{}' collides with the reserved fallback key, field dropped", key)
            }
            Warning::MalformedFallback { reason } => {
                write!(f, "ignoring malformed fallback blob: {}", reason)
            }
        }
    }
}
