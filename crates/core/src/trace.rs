//! Trace types
//!
//! A trace is one contiguous time-series segment: a typed sample array plus a
//! metadata record. The engine never retains a trace beyond a single
//! write or read call.

use crate::timestamp::Timestamp;
use crate::value::{Metadata, MetadataValue};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Sample count of the payload
pub const NPTS: &str = "npts";
/// Sampling interval in seconds
pub const DELTA: &str = "delta";
/// Samples per second, derived from `delta`
pub const SAMPLING_RATE: &str = "sampling_rate";
/// Time of the first sample
pub const STARTTIME: &str = "starttime";
/// Time of the last sample, derived from `starttime`, `delta` and `npts`
pub const ENDTIME: &str = "endtime";
/// Name of the source format the trace was read from
pub const FORMAT: &str = "_format";

/// Sampling interval used when a trace carries no `delta`
pub const DEFAULT_DELTA: f64 = 1.0;

/// Typed 1-D sample payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Samples {
    /// 32-bit integers
    I32(Vec<i32>),
    /// 64-bit integers
    I64(Vec<i64>),
    /// 32-bit floats
    F32(Vec<f32>),
    /// 64-bit floats
    F64(Vec<f64>),
}

impl Samples {
    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            Samples::I32(v) => v.len(),
            Samples::I64(v) => v.len(),
            Samples::F32(v) => v.len(),
            Samples::F64(v) => v.len(),
        }
    }

    /// True if there are no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An empty payload with the same element type
    pub fn empty_like(&self) -> Samples {
        match self {
            Samples::I32(_) => Samples::I32(Vec::new()),
            Samples::I64(_) => Samples::I64(Vec::new()),
            Samples::F32(_) => Samples::F32(Vec::new()),
            Samples::F64(_) => Samples::F64(Vec::new()),
        }
    }

    /// Element type name
    pub fn dtype(&self) -> &'static str {
        match self {
            Samples::I32(_) => "int32",
            Samples::I64(_) => "int64",
            Samples::F32(_) => "float32",
            Samples::F64(_) => "float64",
        }
    }
}

impl Default for Samples {
    fn default() -> Self {
        Samples::F64(Vec::new())
    }
}

/// A time-series segment
///
/// The derivable stats (`npts`, `sampling_rate`, `endtime`) are kept
/// consistent with the payload and `delta`/`starttime` by every constructor,
/// so two traces built from the same inputs compare equal whether or not the
/// caller supplied those fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trace {
    /// Sample payload
    pub data: Samples,
    /// Metadata record
    pub metadata: Metadata,
}

impl Trace {
    /// Build a trace and derive its stats from the payload
    pub fn new(data: Samples, metadata: Metadata) -> Self {
        let npts = data.len();
        let mut trace = Trace { data, metadata };
        trace.derive_stats(npts);
        trace
    }

    /// Build a payload-less trace that still reports `npts` samples
    ///
    /// The payload keeps the element type of `dtype_of` when given.
    pub fn header_only(npts: usize, metadata: Metadata, dtype_of: Option<&Samples>) -> Self {
        let data = dtype_of.map(Samples::empty_like).unwrap_or_default();
        let mut trace = Trace { data, metadata };
        trace.derive_stats(npts);
        trace
    }

    /// Sampling interval in seconds
    pub fn delta(&self) -> f64 {
        self.metadata
            .get(DELTA)
            .and_then(MetadataValue::as_float)
            .unwrap_or(DEFAULT_DELTA)
    }

    /// Time of the first sample, if known
    pub fn starttime(&self) -> Option<&Timestamp> {
        self.metadata.get(STARTTIME).and_then(MetadataValue::as_timestamp)
    }

    /// Declared sample count
    pub fn npts(&self) -> usize {
        self.metadata
            .get(NPTS)
            .and_then(MetadataValue::as_int)
            .map(|n| n.max(0) as usize)
            .unwrap_or_else(|| self.data.len())
    }

    fn derive_stats(&mut self, npts: usize) {
        let delta = self.delta();
        self.metadata
            .insert(NPTS.to_string(), MetadataValue::Int(npts as i64));
        if delta != 0.0 {
            self.metadata
                .insert(SAMPLING_RATE.to_string(), MetadataValue::Float(1.0 / delta));
        }
        if let Some(start) = self.starttime().copied() {
            let span = delta * npts.saturating_sub(1) as f64;
            match start.checked_add(Duration::microseconds((span * 1e6).round() as i64)) {
                Some(end) => {
                    self.metadata
                        .insert(ENDTIME.to_string(), MetadataValue::Timestamp(end));
                }
                // Past the representable range: no endtime
                None => {
                    self.metadata.remove(ENDTIME);
                }
            }
        }
    }
}
