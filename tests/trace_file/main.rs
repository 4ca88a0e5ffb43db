//! Trace File Integration Tests
//!
//! End-to-end tests through `TraceFile`: writes, reads, policies, counters
//! and the on-disk markers.

mod common;

mod counter;
mod fallback;
mod partial_read;
mod properties;
mod round_trip;
mod streaming;
