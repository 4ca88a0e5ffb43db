//! Root-level file markers
//!
//! The root group of a trace file carries:
//! - `format_tag`: always `"tracestore"`; identifies the file
//! - `format_version`: crate version that initialized the file
//! - `index_template`: template the file was first written with
//! - `trace_counter`: next `trc_num`, present once a counter template is used

use crate::error::Result;
use crate::index::IndexTemplate;
use std::path::Path;
use tracestore_storage::{is_container_file, Attribute, ContainerFile, Group, OpenMode};
use tracing::debug;

/// Value of the `format_tag` attribute
pub const FORMAT_TAG: &str = "tracestore";

/// Root attribute holding the format tag
pub const FORMAT_TAG_KEY: &str = "format_tag";
/// Root attribute holding the initializing version
pub const FORMAT_VERSION_KEY: &str = "format_version";
/// Root attribute holding the stored template
pub const INDEX_TEMPLATE_KEY: &str = "index_template";
/// Root attribute holding the next counter value
pub const TRACE_COUNTER_KEY: &str = "trace_counter";

/// Parsed root attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileHeader {
    /// Format tag as stored
    pub format_tag: Option<String>,
    /// Version that initialized the file
    pub format_version: Option<String>,
    /// Stored template text
    pub index_template: Option<String>,
    /// Next counter value
    pub trace_counter: Option<u64>,
}

impl FileHeader {
    /// Read the markers from a root group; absent markers stay `None`
    pub fn load(root: &Group) -> Self {
        let attrs = root.attrs();
        let text = |key: &str| attrs.get(key).and_then(Attribute::as_text);
        FileHeader {
            format_tag: text(FORMAT_TAG_KEY),
            format_version: text(FORMAT_VERSION_KEY),
            index_template: text(INDEX_TEMPLATE_KEY),
            trace_counter: attrs
                .get(TRACE_COUNTER_KEY)
                .and_then(Attribute::as_int)
                .map(|n| n.max(0) as u64),
        }
    }

    /// Load the markers, filling in whatever is missing, and store them
    ///
    /// An existing template is kept; `default_template` only applies to
    /// files that have none yet.
    pub fn init(root: &mut Group, default_template: &IndexTemplate) -> Self {
        let mut header = Self::load(root);
        if header.format_tag.is_none() {
            header.format_tag = Some(FORMAT_TAG.to_string());
            header.format_version = Some(env!("CARGO_PKG_VERSION").to_string());
        }
        if header.index_template.is_none() {
            debug!("Initializing index template '{}'", default_template);
            header.index_template = Some(default_template.as_str().to_string());
        }
        header.store(root);
        header
    }

    /// Write the markers into a root group
    pub fn store(&self, root: &mut Group) {
        let attrs = root.attrs_mut();
        let mut put = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                attrs.insert(key.to_string(), Attribute::Text(v.clone()));
            }
        };
        put(FORMAT_TAG_KEY, &self.format_tag);
        put(FORMAT_VERSION_KEY, &self.format_version);
        put(INDEX_TEMPLATE_KEY, &self.index_template);
        if let Some(n) = self.trace_counter {
            attrs.insert(TRACE_COUNTER_KEY.to_string(), Attribute::Int(n as i64));
        }
    }

    /// True if the root carries the tracestore format tag
    pub fn is_recognized(root: &Group) -> bool {
        Self::load(root)
            .format_tag
            .map_or(false, |tag| tag.eq_ignore_ascii_case(FORMAT_TAG))
    }

    /// Compiled stored template, if any
    pub fn template(&self) -> Result<Option<IndexTemplate>> {
        self.index_template
            .as_deref()
            .map(IndexTemplate::parse)
            .transpose()
    }
}

/// True if `path` is a readable container carrying the tracestore tag
///
/// Never fails: unreadable, corrupt or foreign files yield `false`.
pub fn is_trace_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if !is_container_file(path) {
        return false;
    }
    match ContainerFile::open(path, OpenMode::Read) {
        Ok(file) => FileHeader::is_recognized(file.root()),
        Err(e) => {
            debug!("{} is not a trace file: {}", path.display(), e);
            false
        }
    }
}
