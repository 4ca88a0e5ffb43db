//! Trace placement
//!
//! [`write_trace`] renders a trace's path, resolves collisions with any node
//! already stored there and writes payload plus encoded attributes.

use crate::codec::encode_metadata;
use crate::error::{Error, Result, Warning};
use crate::index::{DerivedFields, IndexTemplate};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracestore_core::trace::{ENDTIME, FORMAT, NPTS, SAMPLING_RATE};
use tracestore_core::{MetadataValue, Trace};
use tracestore_storage::Group;
use tracing::{debug, warn};

/// Fields derived on read and never stored
pub const DERIVED_FIELDS: [&str; 4] = [ENDTIME, SAMPLING_RATE, NPTS, FORMAT];

/// What to do when a node already exists at the rendered path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Warn, then replace the node
    #[default]
    WarnOverride,
    /// Fail with [`Error::DuplicateIndex`]
    Raise,
    /// Replace the node silently
    IgnoreOverride,
    /// Leave the existing node untouched
    Skip,
}

impl FromStr for CollisionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" | "warn-override" => Ok(CollisionPolicy::WarnOverride),
            "raise" => Ok(CollisionPolicy::Raise),
            "ignore" | "ignore-override" => Ok(CollisionPolicy::IgnoreOverride),
            "skip" | "dont" => Ok(CollisionPolicy::Skip),
            _ => Err(Error::InvalidPolicy {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollisionPolicy::WarnOverride => "warn",
            CollisionPolicy::Raise => "raise",
            CollisionPolicy::IgnoreOverride => "ignore",
            CollisionPolicy::Skip => "skip",
        })
    }
}

/// Keys excluded from storage
///
/// Always contains the derived fields; callers add their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    keys: BTreeSet<String>,
}

impl IgnoreSet {
    /// Derived fields plus `extra`
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys: BTreeSet<String> = DERIVED_FIELDS.iter().map(|k| k.to_string()).collect();
        keys.extend(extra.into_iter().map(Into::into));
        IgnoreSet { keys }
    }

    /// True if `key` is excluded for every trace
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Caller-supplied keys, without the derived fields
    pub fn extra(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .map(String::as_str)
            .filter(|k| !DERIVED_FIELDS.contains(k))
    }

    /// Keys excluded for one trace
    ///
    /// A trace read from another format carries that format's private header
    /// under the lower-cased format name; it is excluded as well.
    pub fn for_trace(&self, trace: &Trace) -> BTreeSet<String> {
        let mut keys = self.keys.clone();
        if let Some(format) = trace.metadata.get(FORMAT).and_then(MetadataValue::as_str) {
            keys.insert(format.to_lowercase());
        }
        keys
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

/// Everything [`write_trace`] needs besides the trace
#[derive(Debug, Clone, Copy)]
pub struct WriteContext<'a> {
    /// Template the path is rendered with
    pub template: &'a IndexTemplate,
    /// Collision policy
    pub policy: CollisionPolicy,
    /// Keys excluded from storage
    pub ignore: &'a IgnoreSet,
    /// Replace attributes of an existing dataset, keep its payload
    pub headonly: bool,
    /// Current `trc_num`, when the template uses it
    pub counter: Option<u64>,
}

/// How a trace was placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// New node created
    Written,
    /// Existing node replaced
    Overridden,
    /// Attributes of an existing dataset replaced
    Updated,
    /// Existing node left untouched
    Skipped,
}

impl WriteStatus {
    /// True if a new payload was stored
    pub fn consumes_counter(&self) -> bool {
        matches!(self, WriteStatus::Written | WriteStatus::Overridden)
    }
}

/// Outcome of writing one trace
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// Path relative to the data group
    pub path: String,
    /// What happened
    pub status: WriteStatus,
    /// Value-level problems
    pub warnings: Vec<Warning>,
}

/// Outcomes of a batch write, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReport {
    /// One entry per trace
    pub outcomes: Vec<WriteOutcome>,
}

impl WriteReport {
    /// Number of traces with the given status
    pub fn count(&self, status: WriteStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// All warnings of the batch
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.outcomes.iter().flat_map(|o| o.warnings.iter())
    }
}

/// Write one trace below `group`
pub fn write_trace(group: &mut Group, trace: &Trace, ctx: &WriteContext<'_>) -> Result<WriteOutcome> {
    let mut derived = DerivedFields::from_metadata(&trace.metadata);
    if let Some(n) = ctx.counter {
        derived = derived.with_counter(n);
    }
    let path = ctx.template.render(&trace.metadata, &derived)?;

    let encoded = encode_metadata(&trace.metadata, &ctx.ignore.for_trace(trace));
    let mut warnings = encoded.warnings;

    if ctx.headonly {
        let dataset = group
            .get_mut(&path)
            .and_then(|node| node.as_dataset_mut())
            .ok_or_else(|| Error::HeadonlyMissingDataset { path: path.clone() })?;
        *dataset.attrs_mut() = encoded.native;
        debug!("Updated header of {}", path);
        return Ok(finish(path, WriteStatus::Updated, warnings));
    }

    let status = if group.contains(&path) {
        match ctx.policy {
            CollisionPolicy::Raise => return Err(Error::DuplicateIndex { path }),
            CollisionPolicy::Skip => {
                debug!("Index '{}' already exists, skipping trace", path);
                return Ok(finish(path, WriteStatus::Skipped, Vec::new()));
            }
            CollisionPolicy::WarnOverride => {
                warnings.insert(0, Warning::Override { path: path.clone() });
                WriteStatus::Overridden
            }
            CollisionPolicy::IgnoreOverride => WriteStatus::Overridden,
        }
    } else {
        WriteStatus::Written
    };

    if status == WriteStatus::Overridden {
        group.remove(&path)?;
    }
    let dataset = group.create_dataset(&path, trace.data.clone())?;
    *dataset.attrs_mut() = encoded.native;
    debug!("Placed {} samples at {}", trace.data.len(), path);

    Ok(finish(path, status, warnings))
}

fn finish(path: String, status: WriteStatus, warnings: Vec<Warning>) -> WriteOutcome {
    for w in &warnings {
        warn!("{}: {}", path, w);
    }
    WriteOutcome { path, status, warnings }
}
