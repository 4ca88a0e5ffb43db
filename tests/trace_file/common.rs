//! Shared fixtures

#![allow(dead_code)]

pub use chrono::{Duration, TimeZone, Utc};
pub use std::path::PathBuf;
pub use tempfile::TempDir;
pub use tracestore::prelude::*;

/// Install a test-friendly subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Scratch directory and a file path inside it
pub fn scratch() -> (TempDir, PathBuf) {
    init_tracing();
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("traces.trc");
    (dir, path)
}

pub fn t0() -> Timestamp {
    Timestamp::from_ymd_hms(2009, 8, 24, 0, 20, 3).unwrap()
}

/// `t0()` shifted by whole seconds
pub fn t0_plus(secs: i64) -> Timestamp {
    t0().checked_add(Duration::seconds(secs)).unwrap()
}

/// A trace with full SEED codes, one sample per second
pub fn station_trace(network: &str, station: &str, channel: &str, start: Timestamp, n: usize) -> Trace {
    let mut m = Metadata::new();
    m.insert("network".into(), network.into());
    m.insert("station".into(), station.into());
    m.insert("location".into(), "".into());
    m.insert("channel".into(), channel.into());
    m.insert("starttime".into(), MetadataValue::Timestamp(start));
    m.insert("calib".into(), MetadataValue::Float(1.0));
    let data = (0..n).map(|i| i as f64 * 0.5).collect();
    Trace::new(Samples::F64(data), m)
}

/// Three channels of one station, like a typical three-component record
pub fn three_component() -> Vec<Trace> {
    ["EHZ", "EHN", "EHE"]
        .iter()
        .map(|cha| station_trace("BW", "RJOB", cha, t0(), 11))
        .collect()
}

pub fn config(template: &str, policy: &str) -> SessionConfig {
    SessionConfig::builder()
        .index_template(template)
        .policy(policy)
        .build()
        .expect("valid config")
}

/// Sort key making trace lists comparable regardless of path order
pub fn by_channel(mut traces: Vec<Trace>) -> Vec<Trace> {
    traces.sort_by(|a, b| {
        let key = |t: &Trace| t.metadata.get("channel").and_then(MetadataValue::as_str).map(str::to_string);
        key(a).cmp(&key(b))
    });
    traces
}
