use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::disk_format::directory_entry::DirectoryEntry;
use crate::disk_format::inode::{InodeNumber, InodeType, MAX_FILE_SIZE};
use crate::error::{FsError, Result};
use crate::fs::{FileSystem, Stat};
use crate::storage::VolumeStorage;

/// Opaque textual handle for an open file, unique within a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fkey(String);

impl Fkey {
    /// Wraps an existing textual handle, e.g. one typed at the shell.
    pub fn new(key: impl Into<String>) -> Self {
        Fkey(key.into())
    }

    /// The handle's textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fkey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open-file entry: the inode it refers to and the current position.
#[derive(Clone, Copy, Debug)]
struct OpenFile {
    inode: InodeNumber,
    position: i64,
}

/// Per-process ephemeral state over a mounted volume: the working
/// directory, the open-file table, and the counter that mints file keys.
/// Nothing here is persisted.
///
/// Paths given to the command surface may be absolute or relative to the
/// session's working directory.
pub struct Session<S: VolumeStorage> {
    fs: FileSystem<S>,
    pwd: InodeNumber,
    open_files: HashMap<Fkey, OpenFile>,
    counter: u64,
}

impl<S: VolumeStorage> Session<S> {
    /// Starts a session over `fs` with the working directory at the root.
    pub fn new(fs: FileSystem<S>) -> Self {
        let pwd = fs.root();
        Session {
            fs,
            pwd,
            open_files: HashMap::new(),
            counter: 0,
        }
    }

    /// The mounted volume the session operates on.
    pub fn fs(&self) -> &FileSystem<S> {
        &self.fs
    }

    /// The working directory's inode number.
    pub fn pwd(&self) -> InodeNumber {
        self.pwd
    }

    /// Reformats onto `storage`, replacing the mounted volume. The working
    /// directory returns to the root and all open files are dropped.
    pub fn mkfs(&mut self, storage: S, n: i64) -> Result<()> {
        self.fs = FileSystem::format(storage, n)?;
        self.pwd = self.fs.root();
        self.open_files.clear();
        debug!("session reset after mkfs({n})");
        Ok(())
    }

    /// Persists the superblock and releases the volume.
    pub fn shutdown(self) -> Result<()> {
        self.fs.close()
    }

    /// Creates a regular file at `path`.
    pub fn create_file(&mut self, path: &str) -> Result<InodeNumber> {
        let (name, parent) = self.fs.resolve_parent(self.pwd, path)?;
        self.fs.create(parent, &name, InodeType::Regular)
    }

    /// Creates a directory at `path`.
    pub fn mkdir(&mut self, path: &str) -> Result<InodeNumber> {
        let (name, parent) = self.fs.resolve_parent(self.pwd, path)?;
        self.fs.create(parent, &name, InodeType::Directory)
    }

    /// Creates a hard link at `to` referring to the file at `from`.
    pub fn link(&mut self, from: &str, to: &str) -> Result<()> {
        let source = self.fs.resolve(self.pwd, from)?;
        let (name, parent) = self.fs.resolve_parent(self.pwd, to)?;
        self.fs.link_file(parent, &name, source)
    }

    /// Removes the entry at `path`. The entry itself is removed, so a
    /// symlink is unlinked rather than followed.
    pub fn unlink(&mut self, path: &str) -> Result<()> {
        let (name, parent) = self.fs.resolve_parent(self.pwd, path)?;
        self.fs.unlink_file(parent, &name)
    }

    /// Resizes the regular file at `path` to `size` bytes.
    pub fn truncate(&mut self, path: &str, size: i64) -> Result<()> {
        let file = self.fs.resolve(self.pwd, path)?;
        self.fs.truncate_file(file, size)
    }

    /// Reports metadata for the entry at `path` without following a final
    /// symlink.
    pub fn stat(&self, path: &str) -> Result<Stat> {
        let (name, parent) = self.fs.resolve_parent(self.pwd, path)?;
        let file = self.fs.lookup(parent, &name)?;
        self.fs.stat(file)
    }

    /// Lists the directory at `path`; the empty path lists the working
    /// directory.
    pub fn list(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let dir = self.fs.resolve(self.pwd, path)?;
        self.fs.list(dir)
    }

    /// Changes the working directory to `path`.
    pub fn cd(&mut self, path: &str) -> Result<()> {
        let dir = self.fs.resolve(self.pwd, path)?;
        if !self.fs.read_inode(dir)?.is_directory() {
            return Err(FsError::NotDirectory);
        }
        self.pwd = dir;
        Ok(())
    }

    /// Removes the empty directory at `path`.
    pub fn rmdir(&mut self, path: &str) -> Result<()> {
        let (name, parent) = self.fs.resolve_parent(self.pwd, path)?;
        self.fs.rmdir(parent, &name)
    }

    /// Creates a symlink at `linkpath` whose content is `target`.
    pub fn symlink(&mut self, target: &str, linkpath: &str) -> Result<InodeNumber> {
        let (name, parent) = self.fs.resolve_parent(self.pwd, linkpath)?;
        self.fs.symlink_file(parent, &name, target)
    }

    /// Opens the file at `path` (following symlinks) and returns a fresh
    /// key positioned at offset 0.
    pub fn open(&mut self, path: &str) -> Result<Fkey> {
        let inode = self.fs.resolve(self.pwd, path)?;
        let key = Fkey(self.counter.to_string());
        self.counter += 1;
        self.open_files.insert(key.clone(), OpenFile { inode, position: 0 });
        Ok(key)
    }

    /// Writes `data` at the open file's current position and advances it.
    pub fn write(&mut self, key: &Fkey, data: &[u8]) -> Result<usize> {
        let open = self
            .open_files
            .get_mut(key)
            .ok_or_else(|| FsError::UnknownFd(key.to_string()))?;
        let written = self.fs.write_file(open.inode, open.position, data)?;
        open.position += written as i64;
        Ok(written)
    }

    /// Reads up to `length` bytes at the open file's current position and
    /// advances it by the number of bytes read.
    pub fn read(&mut self, key: &Fkey, length: i64) -> Result<Vec<u8>> {
        let open = self
            .open_files
            .get_mut(key)
            .ok_or_else(|| FsError::UnknownFd(key.to_string()))?;
        // No file can exceed the direct-block maximum, so neither can a read.
        let mut buf = vec![0u8; length.clamp(0, MAX_FILE_SIZE as i64) as usize];
        let read = self.fs.read_file(open.inode, open.position, &mut buf)?;
        open.position += read as i64;
        buf.truncate(read);
        Ok(buf)
    }

    /// Moves the open file's position to `offset`.
    pub fn seek(&mut self, key: &Fkey, offset: i64) -> Result<()> {
        let open = self
            .open_files
            .get_mut(key)
            .ok_or_else(|| FsError::UnknownFd(key.to_string()))?;
        open.position = offset;
        Ok(())
    }

    /// Releases an open file.
    pub fn close(&mut self, key: &Fkey) -> Result<()> {
        self.open_files
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| FsError::UnknownFd(key.to_string()))
    }
}
