//! Hierarchy traversal
//!
//! [`Traversal`] walks a subtree depth-first with an explicit stack and turns
//! every dataset it meets into a [`Trace`]. Children are visited before
//! siblings; siblings in name order. The traversal is lazy and single-pass:
//! nothing is decoded until the next entry is requested.

use crate::codec::decode;
use crate::error::Warning;
use crate::index::{DerivedFields, IndexTemplate};
use std::ops::ControlFlow;
use tracestore_core::{Metadata, Trace};
use tracestore_storage::{join_path, Group, Node};
use tracing::{debug, warn};

/// Read options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOptions {
    /// Subtree to read; defaults to the session data group
    pub group: Option<String>,
    /// Partial metadata narrowing the subtree through the index template
    pub filter: Option<Metadata>,
    /// Decode metadata only
    pub headonly: bool,
}

impl ReadOptions {
    /// Read everything below the data group
    pub fn new() -> Self {
        Self::default()
    }

    /// Read below `group` instead of the data group
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Only read the subtree selected by `filter`
    pub fn filter(mut self, filter: Metadata) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Skip payloads
    pub fn headonly(mut self, headonly: bool) -> Self {
        self.headonly = headonly;
        self
    }

    /// Path of the subtree these options select
    ///
    /// `default_group` applies when no group is set. The filter contributes
    /// the longest prefix of template levels it fully resolves.
    pub fn root_path(&self, default_group: &str, template: &IndexTemplate) -> String {
        let base = self.group.as_deref().unwrap_or(default_group);
        match &self.filter {
            Some(filter) => {
                let prefix = template.render_prefix(filter, &DerivedFields::from_metadata(filter));
                join_path(base, &prefix)
            }
            None => join_path(base, ""),
        }
    }
}

/// One decoded trace and where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    /// Dataset path from the file root
    pub path: String,
    /// Decoded trace
    pub trace: Trace,
    /// Value-level problems met while decoding
    pub warnings: Vec<Warning>,
}

/// Depth-first traversal of a subtree
pub struct Traversal<'a> {
    stack: Vec<(String, &'a Node)>,
    headonly: bool,
}

impl<'a> Traversal<'a> {
    /// Traverse the subtree at `path` below `root`
    ///
    /// `path` may name a group or a single dataset. A missing path yields an
    /// empty traversal.
    pub fn new(root: &'a Group, path: &str, headonly: bool) -> Self {
        let mut traversal = Traversal {
            stack: Vec::new(),
            headonly,
        };
        let start = join_path(path, "");
        debug!("Traversing from '{}' (headonly: {})", start, headonly);
        if start.is_empty() {
            traversal.push_children(&start, root);
        } else {
            match root.get(&start) {
                Some(node) => traversal.stack.push((start, node)),
                None => debug!("Subtree '{}' does not exist", start),
            }
        }
        traversal
    }

    /// Traverse the datasets only, yielding paths without decoding
    pub fn paths(self) -> impl Iterator<Item = String> + 'a {
        let mut stack = self.stack;
        std::iter::from_fn(move || {
            while let Some((path, node)) = stack.pop() {
                match node {
                    Node::Group(g) => {
                        for (name, child) in g.children().rev() {
                            stack.push((join_path(&path, name), child));
                        }
                    }
                    Node::Dataset(_) => return Some(path),
                }
            }
            None
        })
    }

    fn push_children(&mut self, path: &str, group: &'a Group) {
        for (name, child) in group.children().rev() {
            self.stack.push((join_path(path, name), child));
        }
    }
}

impl<'a> Iterator for Traversal<'a> {
    type Item = TraceEntry;

    fn next(&mut self) -> Option<TraceEntry> {
        while let Some((path, node)) = self.stack.pop() {
            let dataset = match node {
                Node::Group(g) => {
                    self.push_children(&path, g);
                    continue;
                }
                Node::Dataset(d) => d,
            };

            let (metadata, warnings) = decode(dataset.attrs());
            for w in &warnings {
                warn!("{}: {}", path, w);
            }
            let trace = if self.headonly {
                Trace::header_only(dataset.len(), metadata, Some(dataset.data()))
            } else {
                Trace::new(dataset.data().clone(), metadata)
            };
            return Some(TraceEntry {
                path,
                trace,
                warnings,
            });
        }
        None
    }
}

/// How a streaming read ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Every trace was handed to the consumer
    Completed {
        /// Traces visited
        visited: usize,
    },
    /// The consumer asked to stop
    Stopped {
        /// Traces visited, including the one that stopped the stream
        visited: usize,
    },
}

impl StreamOutcome {
    /// Number of traces handed to the consumer
    pub fn visited(&self) -> usize {
        match self {
            StreamOutcome::Completed { visited } | StreamOutcome::Stopped { visited } => *visited,
        }
    }

    /// True if the consumer ended the stream early
    pub fn is_stopped(&self) -> bool {
        matches!(self, StreamOutcome::Stopped { .. })
    }
}

/// Hand every trace of `traversal` to `consumer` until it breaks
pub fn stream<F>(traversal: Traversal<'_>, mut consumer: F) -> StreamOutcome
where
    F: FnMut(Trace) -> ControlFlow<()>,
{
    let mut visited = 0;
    for entry in traversal {
        visited += 1;
        if consumer(entry.trace).is_break() {
            debug!("Stream stopped after {} traces", visited);
            return StreamOutcome::Stopped { visited };
        }
    }
    StreamOutcome::Completed { visited }
}
