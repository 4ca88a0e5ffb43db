//! Trace file sessions
//!
//! A [`TraceFile`] owns one open container and the settings it is used with.
//! Three ways to open one:
//!
//! | Constructor | File | Writes | Header-only writes |
//! |-------------|------|--------|--------------------|
//! | [`TraceFile::create`] | truncated | yes | no |
//! | [`TraceFile::append`] | opened, created if missing | yes | yes |
//! | [`TraceFile::open`] | must exist | no | no |
//!
//! Changes are held in memory and reach disk on [`TraceFile::close`]. An
//! unclosed writable session flushes when dropped and logs any failure.

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::header::FileHeader;
use crate::index::IndexTemplate;
use crate::reader::{self, ReadOptions, StreamOutcome, TraceEntry, Traversal};
use crate::writer::{write_trace, WriteContext, WriteReport};
use std::ops::ControlFlow;
use std::path::Path;
use tracestore_core::Trace;
use tracestore_storage::{join_path, path_components, ContainerFile, OpenMode};
use tracing::{debug, info, warn};

/// How a session was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Fresh file
    Create,
    /// Existing file, read-write
    Append,
    /// Existing file, read-only
    Read,
}

impl SessionMode {
    fn open_mode(&self) -> OpenMode {
        match self {
            SessionMode::Create => OpenMode::Create,
            SessionMode::Append => OpenMode::ReadWrite,
            SessionMode::Read => OpenMode::Read,
        }
    }
}

/// An open trace file
#[derive(Debug)]
pub struct TraceFile {
    file: ContainerFile,
    config: SessionConfig,
    header: FileHeader,
    template: IndexTemplate,
    mode: SessionMode,
}

impl TraceFile {
    /// Create a new file, replacing any existing one
    ///
    /// Header-only configurations are rejected before the file is touched;
    /// a fresh file has no datasets whose headers could be rewritten.
    pub fn create(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self> {
        if config.headonly {
            return Err(Error::InvalidMode(
                "header-only writes need an append session".to_string(),
            ));
        }
        Self::open_with(path.as_ref(), config, SessionMode::Create)
    }

    /// Open a file for writing, creating it if missing
    pub fn append(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self> {
        Self::open_with(path.as_ref(), config, SessionMode::Append)
    }

    /// Open an existing file read-only
    pub fn open(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self> {
        Self::open_with(path.as_ref(), config, SessionMode::Read)
    }

    fn open_with(path: &Path, config: SessionConfig, mode: SessionMode) -> Result<Self> {
        let mut file = ContainerFile::open(path, mode.open_mode())?;

        if !file.root().is_empty() && !FileHeader::is_recognized(file.root()) {
            warn!("{} carries no tracestore format tag", path.display());
        }
        let header = if mode == SessionMode::Read {
            FileHeader::load(file.root())
        } else {
            FileHeader::init(file.root_mut()?, &config.index_template)
        };
        let template = header
            .template()?
            .unwrap_or_else(|| config.index_template.clone());

        info!(
            "Opened {} ({:?}, template '{}')",
            path.display(),
            mode,
            template
        );
        Ok(TraceFile {
            file,
            config,
            header,
            template,
            mode,
        })
    }

    /// File path
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// How the session was opened
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Session settings
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Root markers as last loaded or stored
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Template in effect: the stored one, else the configured one
    pub fn index_template(&self) -> &IndexTemplate {
        &self.template
    }

    /// Replace the stored template
    ///
    /// Existing traces keep their paths; only later writes and filtered
    /// reads use the new template.
    pub fn set_index_template(&mut self, template: IndexTemplate) -> Result<()> {
        self.ensure_writable()?;
        info!("Replacing index template '{}' with '{}'", self.template, template);
        self.header.index_template = Some(template.as_str().to_string());
        self.header.store(self.file.root_mut()?);
        self.template = template;
        Ok(())
    }

    /// Write traces in order
    ///
    /// Stops at the first structural failure; traces written before it stay
    /// written and the counter reflects them.
    pub fn write(&mut self, traces: &[Trace]) -> Result<WriteReport> {
        self.ensure_writable()?;

        let uses_counter = self.template.uses_counter();
        let mut counter = self.header.trace_counter.unwrap_or(0);
        let mut report = WriteReport::default();

        let root = self.file.root_mut()?;
        let result = root.require_group(&self.config.group).map_err(Error::from).and_then(|group| {
            traces.iter().try_for_each(|trace| -> Result<()> {
                let ctx = WriteContext {
                    template: &self.template,
                    policy: self.config.policy,
                    ignore: &self.config.ignore,
                    headonly: self.config.headonly,
                    counter: uses_counter.then_some(counter),
                };
                let mut outcome = write_trace(group, trace, &ctx)?;
                if uses_counter && outcome.status.consumes_counter() {
                    counter += 1;
                }
                outcome.path = join_path(&self.config.group, &outcome.path);
                report.outcomes.push(outcome);
                Ok(())
            })
        });

        if uses_counter {
            self.header.trace_counter = Some(counter);
            self.header.store(root);
        }
        debug!("Wrote {} traces to {}", report.outcomes.len(), self.file.path().display());
        result.map(|()| report)
    }

    /// Lazily decode the traces selected by `opts`
    pub fn iter(&self, opts: &ReadOptions) -> Traversal<'_> {
        let root_path = opts.root_path(&self.config.group, &self.template);
        Traversal::new(
            self.file.root(),
            &root_path,
            opts.headonly || self.config.headonly,
        )
    }

    /// Decode the traces selected by `opts`
    pub fn read(&self, opts: &ReadOptions) -> Vec<Trace> {
        self.iter(opts).map(|entry| entry.trace).collect()
    }

    /// Hand each selected trace to `consumer` until it breaks
    pub fn for_each<F>(&self, opts: &ReadOptions, consumer: F) -> StreamOutcome
    where
        F: FnMut(Trace) -> ControlFlow<()>,
    {
        reader::stream(self.iter(opts), consumer)
    }

    /// Dataset paths below the data group, in traversal order
    pub fn paths(&self) -> Vec<String> {
        Traversal::new(self.file.root(), &self.config.group, false)
            .paths()
            .collect()
    }

    /// Number of traces below the data group
    pub fn len(&self) -> usize {
        self.paths().len()
    }

    /// True if the data group holds no traces
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Trace at ordinal `index`
    pub fn get_at(&self, index: usize) -> Result<TraceEntry> {
        let paths = self.paths();
        let path = paths.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: paths.len(),
        })?;
        Traversal::new(self.file.root(), path, self.config.headonly)
            .next()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: paths.len(),
            })
    }

    /// Traces at ordinals `start..end`
    pub fn get_range(&self, start: usize, end: usize) -> Result<Vec<TraceEntry>> {
        let paths = self.paths();
        let selected = Self::select(&paths, start, end)?;
        Ok(selected
            .iter()
            .flat_map(|path| Traversal::new(self.file.root(), path, self.config.headonly))
            .collect())
    }

    /// Remove the trace at ordinal `index`, returning its path
    pub fn delete_at(&mut self, index: usize) -> Result<String> {
        let end = index.checked_add(1).ok_or_else(|| Error::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        let mut removed = self.delete_range(index, end)?;
        removed.pop().ok_or(Error::IndexOutOfRange { index, len: 0 })
    }

    /// Remove the traces at ordinals `start..end`, returning their paths
    ///
    /// Groups left without children are removed as well; the data group
    /// itself is kept.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<Vec<String>> {
        self.ensure_writable()?;
        let paths = self.paths();
        let selected = Self::select(&paths, start, end)?.to_vec();

        let root = self.file.root_mut()?;
        let group = root.require_group(&self.config.group)?;
        let skip = path_components(&self.config.group).len();
        for path in &selected {
            let relative = path_components(path)[skip..].join("/");
            group.remove(&relative)?;
            let pruned = group.prune_empty_parents(&relative)?;
            debug!("Deleted {} ({} empty groups pruned)", path, pruned);
        }
        Ok(selected)
    }

    /// Flush and close the file
    pub fn close(self) -> Result<()> {
        info!("Closing {}", self.file.path().display());
        self.file.close()?;
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.mode == SessionMode::Read {
            return Err(Error::ReadOnly {
                path: self.file.path().display().to_string(),
            });
        }
        Ok(())
    }

    fn select(paths: &[String], start: usize, end: usize) -> Result<&[String]> {
        if end > paths.len() {
            return Err(Error::IndexOutOfRange {
                index: end.saturating_sub(1),
                len: paths.len(),
            });
        }
        if start > end {
            return Err(Error::IndexOutOfRange {
                index: start,
                len: paths.len(),
            });
        }
        Ok(&paths[start..end])
    }
}
