//! Group/dataset tree
//!
//! A container is a tree of named nodes. Groups hold children and
//! attributes; datasets hold a typed payload and attributes. Children are
//! kept in name order, which is the native child ordering of the container.
//!
//! Paths are `/`-separated; empty components (leading, trailing or doubled
//! slashes) are ignored, so `"/a//b/"` and `"a/b"` name the same node.

use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracestore_core::Samples;

/// Native attribute value
///
/// This is the whole type system the container offers for attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Fixed-length byte string
    Bytes(Vec<u8>),
    /// Variable-length UTF-8 string
    Text(String),
    /// Rank-1 integer array
    IntArray(Vec<i64>),
    /// Rank-1 float array
    FloatArray(Vec<f64>),
}

impl Attribute {
    /// View as text, decoding byte strings as UTF-8
    pub fn as_text(&self) -> Option<String> {
        match self {
            Attribute::Text(s) => Some(s.clone()),
            Attribute::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Attribute::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// Attribute set of a group or dataset
pub type Attributes = BTreeMap<String, Attribute>;

/// A payload node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    data: Samples,
    attrs: Attributes,
}

impl Dataset {
    /// Create a dataset with no attributes
    pub fn new(data: Samples) -> Self {
        Dataset {
            data,
            attrs: Attributes::new(),
        }
    }

    /// Declared length of the payload
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Payload
    pub fn data(&self) -> &Samples {
        &self.data
    }

    /// Attributes
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Mutable attributes
    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Interior node
    Group(Group),
    /// Leaf node
    Dataset(Dataset),
}

impl Node {
    /// Try to view as a group
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(g) => Some(g),
            Node::Dataset(_) => None,
        }
    }

    /// Try to view as a dataset
    pub fn as_dataset(&self) -> Option<&Dataset> {
        match self {
            Node::Dataset(d) => Some(d),
            Node::Group(_) => None,
        }
    }

    /// Try to view as a mutable dataset
    pub fn as_dataset_mut(&mut self) -> Option<&mut Dataset> {
        match self {
            Node::Dataset(d) => Some(d),
            Node::Group(_) => None,
        }
    }

    /// True for datasets
    pub fn is_dataset(&self) -> bool {
        matches!(self, Node::Dataset(_))
    }
}

/// An interior node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    children: BTreeMap<String, Node>,
    attrs: Attributes,
}

/// Split a path into its non-empty components
pub fn path_components(path: &str) -> Vec<&str> {
    path.split('/').filter(|c| !c.is_empty()).collect()
}

/// Join path components, skipping empty ones
pub fn join_path(parent: &str, child: &str) -> String {
    let mut parts = path_components(parent);
    parts.extend(path_components(child));
    parts.join("/")
}

fn split_parent(path: &str) -> StorageResult<(String, String)> {
    let mut parts = path_components(path);
    let name = parts.pop().ok_or_else(|| StorageError::InvalidPath {
        path: path.to_string(),
    })?;
    Ok((parts.join("/"), name.to_string()))
}

impl Group {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Mutable attributes
    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    /// Direct children in name order
    pub fn children(&self) -> impl DoubleEndedIterator<Item = (&String, &Node)> {
        self.children.iter()
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if the group has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Look up a node below this group
    ///
    /// Returns `None` for the empty path; use [`Group::group`] to address the
    /// group itself.
    pub fn get(&self, path: &str) -> Option<&Node> {
        let parts = path_components(path);
        let (last, parents) = parts.split_last()?;
        let mut current = self;
        for name in parents {
            current = current.children.get(*name)?.as_group()?;
        }
        current.children.get(*last)
    }

    /// Look up a node below this group, mutably
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Node> {
        let parts = path_components(path);
        let (last, parents) = parts.split_last()?;
        let mut current = self;
        for name in parents {
            current = match current.children.get_mut(*name)? {
                Node::Group(g) => g,
                Node::Dataset(_) => return None,
            };
        }
        current.children.get_mut(*last)
    }

    /// True if any node exists at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Resolve a group path; the empty path is this group
    pub fn group(&self, path: &str) -> Option<&Group> {
        let mut current = self;
        for name in path_components(path) {
            current = current.children.get(name)?.as_group()?;
        }
        Some(current)
    }

    fn group_mut(&mut self, path: &str) -> Option<&mut Group> {
        let mut current = self;
        for name in path_components(path) {
            current = match current.children.get_mut(name)? {
                Node::Group(g) => g,
                Node::Dataset(_) => return None,
            };
        }
        Some(current)
    }

    /// Return the group at `path`, creating missing groups along the way
    pub fn require_group(&mut self, path: &str) -> StorageResult<&mut Group> {
        let parts = path_components(path);
        let mut current = self;
        for (depth, name) in parts.iter().enumerate() {
            let node = current
                .children
                .entry(name.to_string())
                .or_insert_with(|| Node::Group(Group::new()));
            current = match node {
                Node::Group(g) => g,
                Node::Dataset(_) => {
                    return Err(StorageError::NotAGroup {
                        path: parts[..=depth].join("/"),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Create a dataset at `path`, creating intermediate groups
    pub fn create_dataset(&mut self, path: &str, data: Samples) -> StorageResult<&mut Dataset> {
        let (parent, name) = split_parent(path)?;
        let group = self.require_group(&parent)?;
        match group.children.entry(name) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists {
                path: path.to_string(),
            }),
            Entry::Vacant(slot) => slot
                .insert(Node::Dataset(Dataset::new(data)))
                .as_dataset_mut()
                .ok_or_else(|| StorageError::InvalidPath {
                    path: path.to_string(),
                }),
        }
    }

    /// Detach and return the node at `path`
    pub fn remove(&mut self, path: &str) -> StorageResult<Node> {
        let (parent, name) = split_parent(path)?;
        self.group_mut(&parent)
            .and_then(|g| g.children.remove(&name))
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })
    }

    /// Remove groups along `path` that have been left without children
    ///
    /// Walks upward from the parent of `path` and stops at the first group
    /// that still has children. This group itself is never removed.
    pub fn prune_empty_parents(&mut self, path: &str) -> StorageResult<usize> {
        let parts = path_components(path);
        let mut pruned = 0;
        for depth in (1..parts.len()).rev() {
            let ancestor = parts[..depth].join("/");
            if !self.group(&ancestor).map_or(false, Group::is_empty) {
                break;
            }
            self.remove(&ancestor)?;
            pruned += 1;
        }
        Ok(pruned)
    }
}
