//! Timestamp wire form
//!
//! Container attributes have no timestamp type, so timestamps travel as
//! fixed-width ISO-8601 strings:
//!
//! ```text
//! 2009-08-24T00:20:03.000000Z
//! ```
//!
//! Exactly 27 characters, microsecond precision, `Z` suffix. Any untyped
//! string read back from a container that has this shape and parses is
//! treated as a timestamp.
//!
//! [`Timestamp`] holds microseconds only, so every value formats to a wire
//! form that parses back to itself. Years outside 0000..=9999 have no wire
//! form at all.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the wire form
pub const TIMESTAMP_WIRE_LEN: usize = 27;

/// Earliest year with a wire form
pub const MIN_WIRE_YEAR: i32 = 0;
/// Latest year with a wire form
pub const MAX_WIRE_YEAR: i32 = 9999;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// UTC instant with microsecond precision
///
/// Sub-microsecond digits are truncated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "DateTime<Utc>", into = "DateTime<Utc>")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a chrono instant, truncating to whole microseconds
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Timestamp(dt.trunc_subsecs(6))
    }

    /// Microseconds since the Unix epoch
    pub fn from_micros(us: i64) -> Option<Self> {
        Utc.timestamp_micros(us).single().map(Timestamp)
    }

    /// Calendar date and time of day, whole seconds
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Timestamp)
    }

    /// The underlying chrono instant
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Microseconds since the Unix epoch
    pub fn timestamp_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    /// `self + delta`, or `None` past chrono's representable range
    pub fn checked_add(self, delta: Duration) -> Option<Self> {
        self.0.checked_add_signed(delta).map(Self::from_datetime)
    }

    /// Signed span from `earlier` to `self`
    pub fn since(&self, earlier: &Timestamp) -> Duration {
        self.0.signed_duration_since(earlier.0)
    }

    /// True if the year fits the four-digit wire form
    pub fn has_wire_form(&self) -> bool {
        (MIN_WIRE_YEAR..=MAX_WIRE_YEAR).contains(&self.0.year())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::from_datetime(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_timestamp(self) {
            Some(wire) => f.write_str(&wire),
            None => f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }
}

/// Render a timestamp in its canonical 27-character wire form
///
/// Returns `None` for years outside 0000..=9999.
pub fn format_timestamp(ts: &Timestamp) -> Option<String> {
    ts.has_wire_form()
        .then(|| ts.0.format(WIRE_FORMAT).to_string())
}

/// Shape check only: length 27 and a trailing `Z`
pub fn is_timestamp_shaped(s: &str) -> bool {
    s.len() == TIMESTAMP_WIRE_LEN && s.ends_with('Z')
}

/// Parse a wire-form timestamp
///
/// Returns `None` when the string is not timestamp-shaped or does not parse.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    if !is_timestamp_shaped(s) {
        return None;
    }
    NaiveDateTime::parse_from_str(&s[..TIMESTAMP_WIRE_LEN - 1], "%Y-%m-%dT%H:%M:%S%.6f")
        .ok()
        .map(|naive| Timestamp::from_datetime(naive.and_utc()))
}
