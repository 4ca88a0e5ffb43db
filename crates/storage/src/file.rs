//! Container file handle
//!
//! The whole tree is loaded on open and written back on flush. Flushing
//! writes a sibling `.tmp` file and renames it over the target, so a crash
//! mid-flush leaves the previous image intact.

use crate::error::{StorageError, StorageResult};
use crate::format::{decode_container, encode_container, has_magic, CONTAINER_MAGIC};
use crate::node::Group;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// How a container file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Existing file, no mutation
    Read,
    /// Existing file opened for update, created if missing
    ReadWrite,
    /// New empty file, truncating any existing one
    Create,
}

impl OpenMode {
    /// True if the mode permits mutation
    pub fn is_writable(&self) -> bool {
        !matches!(self, OpenMode::Read)
    }
}

/// An open container file
///
/// Dropping a writable handle with unflushed changes flushes best-effort;
/// call [`ContainerFile::close`] to observe flush errors.
#[derive(Debug)]
pub struct ContainerFile {
    path: PathBuf,
    mode: OpenMode,
    root: Group,
    dirty: bool,
    closed: bool,
}

impl ContainerFile {
    /// Open a container file
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let (root, fresh) = match mode {
            OpenMode::Read => (load(&path)?, false),
            OpenMode::ReadWrite if path.exists() => (load(&path)?, false),
            OpenMode::ReadWrite | OpenMode::Create => (Group::new(), true),
        };

        let mut file = ContainerFile {
            path,
            mode,
            root,
            dirty: fresh,
            closed: false,
        };
        if fresh {
            file.flush()?;
        }
        debug!("Opened container {} ({:?})", file.path.display(), mode);
        Ok(file)
    }

    /// File path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the file was opened with
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Root group
    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Root group for mutation; marks the file dirty
    pub fn root_mut(&mut self) -> StorageResult<&mut Group> {
        if !self.mode.is_writable() {
            return Err(StorageError::ReadOnly {
                path: self.path.display().to_string(),
            });
        }
        self.dirty = true;
        Ok(&mut self.root)
    }

    /// Write pending changes to disk
    pub fn flush(&mut self) -> StorageResult<()> {
        if !self.mode.is_writable() || !self.dirty {
            return Ok(());
        }
        let image = encode_container(&self.root)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        {
            let mut f = File::create(&tmp)?;
            f.write_all(&image)?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        self.dirty = false;
        debug!("Flushed {} bytes to {}", image.len(), self.path.display());
        Ok(())
    }

    /// Flush and release the handle
    pub fn close(mut self) -> StorageResult<()> {
        let result = self.flush();
        self.closed = true;
        result
    }
}

impl Drop for ContainerFile {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.flush() {
            error!("Failed to flush container {} on drop: {}", self.path.display(), e);
        }
    }
}

fn load(path: &Path) -> StorageResult<Group> {
    let bytes = fs::read(path)?;
    decode_container(&bytes)
}

/// Probe whether `path` looks like a container file
///
/// Checks the magic bytes only; never fails.
pub fn is_container_file(path: impl AsRef<Path>) -> bool {
    let mut magic = [0u8; CONTAINER_MAGIC.len()];
    match File::open(path.as_ref()).and_then(|mut f| f.read_exact(&mut magic)) {
        Ok(()) => has_magic(&magic),
        Err(_) => false,
    }
}
