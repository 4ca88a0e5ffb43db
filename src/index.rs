//! Index templates
//!
//! An index template turns a trace's metadata into the hierarchical path the
//! trace is stored under. Templates use `{field}` / `{field:spec}`
//! placeholders; `/` separates hierarchy levels:
//!
//! ```text
//! {network}.{station}/{location}.{channel}/{starttime:%Y-%m-%dT%H:%M:%S}_{endtime:%Y-%m-%dT%H:%M:%S}
//! ```
//!
//! ## Format specs
//!
//! | Value | Spec | Example |
//! |-------|------|---------|
//! | Timestamp | strftime pattern | `{starttime:%Y%m%d}` |
//! | Int | `[0][width]d` | `{trc_num:06d}` |
//! | Float | `[0][width][.prec]f` | `{duration:.1f}` |
//! | String | `[width][s]` | `{station:5}` |
//!
//! Without a spec, timestamps render in their 27-character wire form.
//! `{{` and `}}` are literal braces. A `.datetime` suffix on a field name is
//! accepted and ignored.
//!
//! ## Derived fields
//!
//! Besides the metadata record, templates may use `trc_num` (running trace
//! counter), `duration` (seconds from `starttime` to `endtime`) and `seedid`
//! (`network.station.location.channel`). A metadata field with the same name
//! shadows the derived one.
//!
//! Rendering is pure string formatting: no I/O, metadata is never mutated.

use crate::error::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use std::fmt;
use tracestore_core::{format_timestamp, Metadata, MetadataValue, Timestamp};

/// Derived field: running trace counter
pub const TRC_NUM: &str = "trc_num";
/// Derived field: `endtime - starttime` in seconds
pub const DURATION: &str = "duration";
/// Derived field: `network.station.location.channel`
pub const SEEDID: &str = "seedid";

/// One hierarchy level per station, one per channel, then the time window
pub const STANDARD: &str = "{network}.{station}/{location}.{channel}/\
                            {starttime:%Y-%m-%dT%H:%M:%S}_{endtime:%Y-%m-%dT%H:%M:%S}";
/// Every trace directly under the data group
pub const FLAT: &str = "{network}.{station}.{location}.{channel}_\
                        {starttime:%Y-%m-%dT%H:%M:%S}_{endtime:%Y-%m-%dT%H:%M:%S}";
/// One hierarchy level per code
pub const NESTED: &str = "{network}/{station}/{location}/{channel}/\
                          {starttime:%Y-%m-%dT%H:%M:%S}_{endtime:%Y-%m-%dT%H:%M:%S}";
/// Station pairs, for cross-correlations
pub const XCORR: &str = "{network1}.{station1}-{network2}.{station2}/\
                         {location1}.{channel1}-{location2}.{channel2}/\
                         {starttime:%Y-%m-%dT%H:%M:%S}_{endtime:%Y-%m-%dT%H:%M:%S}";
/// Traces numbered in write order
pub const COUNTER: &str = "{trc_num:06d}";

const DATETIME_SUFFIX: &str = ".datetime";

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Literal(String),
    Field { name: String, spec: Option<String> },
    Invalid(String),
}

/// A compiled index template
#[derive(Debug, Clone, PartialEq)]
pub struct IndexTemplate {
    source: String,
    segments: Vec<Vec<Piece>>,
}

impl IndexTemplate {
    /// Resolve a preset name (`standard`, `flat`, `nested`, `xcorr`,
    /// `counter`) or parse a custom template
    pub fn resolve(name_or_template: &str) -> Result<Self> {
        match Self::preset(name_or_template) {
            Some(template) => Ok(template),
            None => Self::parse(name_or_template),
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        let source = match name {
            "standard" => STANDARD,
            "flat" => FLAT,
            "nested" => NESTED,
            "xcorr" => XCORR,
            "counter" => COUNTER,
            _ => return None,
        };
        Some(Self::compile(source))
    }

    /// The default template
    pub fn standard() -> Self {
        Self::compile(STANDARD)
    }

    /// Parse a custom template, rejecting malformed placeholders
    pub fn parse(source: &str) -> Result<Self> {
        let template = Self::compile(source);
        let invalid = template.segments.iter().flatten().find_map(|p| match p {
            Piece::Invalid(reason) => Some(reason.clone()),
            _ => None,
        });
        match invalid {
            Some(reason) => Err(Error::InvalidTemplate {
                template: source.to_string(),
                reason,
            }),
            None if source.trim().is_empty() => Err(Error::InvalidTemplate {
                template: source.to_string(),
                reason: "template is empty".to_string(),
            }),
            None => Ok(template),
        }
    }

    /// Template text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of hierarchy levels
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// True if the running counter appears in the template
    pub fn uses_counter(&self) -> bool {
        self.field_names().any(|name| name == TRC_NUM)
    }

    /// Placeholder names in order of appearance
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().flatten().filter_map(|p| match p {
            Piece::Field { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Render the full path
    ///
    /// Fails with [`Error::MissingField`] if any placeholder cannot be
    /// resolved.
    pub fn render(&self, metadata: &Metadata, derived: &DerivedFields) -> Result<String> {
        let rendered = self
            .segments
            .iter()
            .map(|segment| self.render_segment(segment, metadata, derived))
            .collect::<Result<Vec<_>>>()?;
        Ok(rendered.join("/"))
    }

    /// Render the longest prefix of fully resolvable levels
    ///
    /// Levels are resolved left to right; the first level with an
    /// unresolvable placeholder ends the prefix. The result may be empty.
    pub fn render_prefix(&self, metadata: &Metadata, derived: &DerivedFields) -> String {
        let mut levels = Vec::new();
        for segment in &self.segments {
            match self.render_segment(segment, metadata, derived) {
                Ok(level) => levels.push(level),
                Err(_) => break,
            }
        }
        levels.join("/")
    }

    fn render_segment(
        &self,
        segment: &[Piece],
        metadata: &Metadata,
        derived: &DerivedFields,
    ) -> Result<String> {
        let mut out = String::new();
        for piece in segment {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Field { name, spec } => {
                    let value = metadata
                        .get(name)
                        .or_else(|| derived.get(name))
                        .ok_or_else(|| Error::MissingField {
                            field: name.clone(),
                            template: self.source.clone(),
                        })?;
                    out.push_str(&self.format_value(name, value, spec.as_deref())?);
                }
                Piece::Invalid(reason) => return Err(self.invalid(reason.clone())),
            }
        }
        Ok(out)
    }

    fn format_value(&self, name: &str, value: &MetadataValue, spec: Option<&str>) -> Result<String> {
        match value {
            MetadataValue::Timestamp(t) => match spec {
                None => format_timestamp(t).ok_or_else(|| {
                    self.invalid(format!("timestamp field '{}' ({}) has no wire form", name, t))
                }),
                Some(pattern) => self.format_strftime(t, pattern),
            },
            MetadataValue::Int(i) => {
                let spec = self.number_spec(spec)?;
                match spec.kind {
                    Some('f') => Ok(spec.float(*i as f64)),
                    _ => Ok(spec.int(*i)),
                }
            }
            MetadataValue::Float(f) => {
                let spec = self.number_spec(spec)?;
                match spec.kind {
                    Some('d') => Err(self.invalid(format!("field '{}' is a float, spec 'd' needs an integer", name))),
                    _ => Ok(spec.float(*f)),
                }
            }
            MetadataValue::String(s) => {
                let spec = self.number_spec(spec)?;
                match spec.kind {
                    None | Some('s') => Ok(format!("{:<width$}", s, width = spec.width)),
                    Some(kind) => Err(self.invalid(format!("field '{}' is a string, spec '{}' needs a number", name, kind))),
                }
            }
            other => Err(self.invalid(format!(
                "field '{}' of type {} cannot be rendered into a path",
                name,
                other.type_name()
            ))),
        }
    }

    fn format_strftime(&self, t: &Timestamp, pattern: &str) -> Result<String> {
        let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(self.invalid(format!("bad strftime pattern '{}'", pattern)));
        }
        Ok(t.as_datetime().format_with_items(items.iter()).to_string())
    }

    fn number_spec(&self, spec: Option<&str>) -> Result<NumberSpec> {
        match spec {
            None => Ok(NumberSpec::default()),
            Some(s) => NumberSpec::parse(s).ok_or_else(|| self.invalid(format!("bad format spec '{}'", s))),
        }
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidTemplate {
            template: self.source.clone(),
            reason,
        }
    }

    fn compile(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => pieces.push(Piece::Invalid("unmatched '}'".to_string())),
                '/' => {
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(std::mem::take(&mut pieces));
                }
                '{' => {
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    let mut body = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        body.push(inner);
                    }
                    pieces.push(if closed {
                        parse_placeholder(&body)
                    } else {
                        Piece::Invalid("unterminated placeholder".to_string())
                    });
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        segments.push(pieces);

        IndexTemplate {
            source: source.to_string(),
            segments,
        }
    }
}

impl Default for IndexTemplate {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for IndexTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_placeholder(body: &str) -> Piece {
    let (name, spec) = match body.split_once(':') {
        Some((name, spec)) => (name, Some(spec.to_string())),
        None => (body, None),
    };
    let name = name.trim();
    let name = name.strip_suffix(DATETIME_SUFFIX).unwrap_or(name);
    if name.is_empty() {
        return Piece::Invalid("empty placeholder".to_string());
    }
    Piece::Field {
        name: name.to_string(),
        spec,
    }
}

#[derive(Debug, Default)]
struct NumberSpec {
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<char>,
}

impl NumberSpec {
    fn parse(spec: &str) -> Option<Self> {
        let mut out = NumberSpec::default();
        let mut rest = spec;
        if let Some(r) = rest.strip_prefix('0') {
            out.zero = true;
            rest = r;
        }
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 {
            out.width = rest[..digits].parse().ok()?;
            rest = &rest[digits..];
        }
        if let Some(r) = rest.strip_prefix('.') {
            let digits = r.len() - r.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits == 0 {
                return None;
            }
            out.precision = Some(r[..digits].parse().ok()?);
            rest = &r[digits..];
        }
        let mut chars = rest.chars();
        out.kind = chars.next();
        if chars.next().is_some() || !matches!(out.kind, None | Some('d' | 'f' | 's')) {
            return None;
        }
        Some(out)
    }

    fn int(&self, i: i64) -> String {
        if self.zero {
            format!("{:0width$}", i, width = self.width)
        } else {
            format!("{:>width$}", i, width = self.width)
        }
    }

    fn float(&self, f: f64) -> String {
        let precision = match (self.precision, self.kind) {
            (Some(p), _) => Some(p),
            (None, Some('f')) => Some(6),
            (None, _) => None,
        };
        match (precision, self.zero) {
            (Some(p), true) => format!("{:0width$.p$}", f, width = self.width, p = p),
            (Some(p), false) => format!("{:>width$.p$}", f, width = self.width, p = p),
            (None, zero) => self.pad(shortest_float(f), zero),
        }
    }

    fn pad(&self, s: String, zero: bool) -> String {
        let len = s.chars().count();
        if len >= self.width {
            return s;
        }
        let fill = self.width - len;
        match (zero, s.strip_prefix('-')) {
            (true, Some(digits)) => format!("-{}{}", "0".repeat(fill), digits),
            (true, None) => format!("{}{}", "0".repeat(fill), s),
            (false, _) => format!("{}{}", " ".repeat(fill), s),
        }
    }
}

/// Shortest round-trip form of a float, as Python's `repr` writes it
///
/// Positional between 1e-4 and 1e16 with at least one fractional digit,
/// otherwise `d.ddde+XX` with a signed, two-digit-minimum exponent.
fn shortest_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let sci = format!("{:e}", f);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if (-4..16).contains(&exp) {
        let plain = f.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    }
}

/// Fields computed from the metadata rather than stored in it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedFields {
    fields: Metadata,
}

impl DerivedFields {
    /// Compute `duration` and `seedid` where their inputs are present
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let mut fields = Metadata::new();

        let start = metadata.get("starttime").and_then(MetadataValue::as_timestamp);
        let end = metadata.get("endtime").and_then(MetadataValue::as_timestamp);
        if let (Some(start), Some(end)) = (start, end) {
            let span = end.since(start);
            let seconds = span
                .num_microseconds()
                .map(|us| us as f64 / 1e6)
                .unwrap_or(span.num_seconds() as f64);
            fields.insert(DURATION.to_string(), MetadataValue::Float(seconds));
        }

        let codes: Option<Vec<&str>> = ["network", "station", "location", "channel"]
            .iter()
            .map(|k| metadata.get(*k).and_then(MetadataValue::as_str))
            .collect();
        if let Some(codes) = codes {
            fields.insert(SEEDID.to_string(), MetadataValue::String(codes.join(".")));
        }

        DerivedFields { fields }
    }

    /// Add the running counter
    pub fn with_counter(mut self, counter: u64) -> Self {
        self.fields
            .insert(TRC_NUM.to_string(), MetadataValue::Int(counter as i64));
        self
    }

    /// Look up a derived field
    pub fn get(&self, name: &str) -> Option<&MetadataValue> {
        self.fields.get(name)
    }
}
