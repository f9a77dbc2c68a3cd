use std::fmt;

use crate::disk_format::directory_entry::DirectoryEntry;
use crate::disk_format::inode::{Inode, InodeNumber, InodeType};
use crate::error::{FsError, Result};
use crate::storage::VolumeStorage;

use super::FileSystem;

/// Metadata of one inode, as reported by `stat`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stat {
    /// Inode number.
    pub inode: InodeNumber,
    /// File type.
    pub file_type: InodeType,
    /// File size in bytes.
    pub size: i64,
    /// Number of directory entries referring to the inode.
    pub links: i64,
    /// For symlinks, the entire content read as text.
    pub symlink_target: Option<String>,
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ftype = match (self.file_type, &self.symlink_target) {
            (InodeType::Directory, _) => "d".to_owned(),
            (InodeType::Regular, _) => "r".to_owned(),
            (InodeType::Symlink, Some(target)) => format!("s ({target})"),
            (InodeType::Symlink, None) => "s".to_owned(),
        };
        writeln!(f, "inode:\t{}", self.inode)?;
        writeln!(f, "ftype:\t{ftype}")?;
        writeln!(f, "size:\t{}", self.size)?;
        write!(f, "links:\t{}", self.links)
    }
}

impl<S: VolumeStorage> FileSystem<S> {
    /// Creates a file of `file_type` named `name` under directory `dir` and
    /// returns the new inode number.
    ///
    /// New directories come into being with `"."` and `".."` entries; the
    /// `".."` entry references `dir` and bumps its link count.
    pub fn create(&mut self, dir: InodeNumber, name: &str, file_type: InodeType) -> Result<InodeNumber> {
        let parent = self.read_inode(dir)?;
        if !parent.is_directory() {
            return Err(FsError::NotDirectory);
        }

        let child = match file_type {
            InodeType::Directory => {
                let mut child = self.allocate_directory()?;
                let child_id = child.id;
                self.add_entry(&mut child, ".", child_id)?;
                self.add_entry(&mut child, "..", parent.id)?;
                child
            }
            _ => {
                let mut child = self.allocate_inode()?;
                child.file_type = file_type;
                self.write_inode(&child)?;
                child
            }
        };

        // The ".." entry may have bumped the parent's link count on disk;
        // re-read before rewriting its contents.
        let mut parent = self.read_inode(dir)?;
        self.add_entry(&mut parent, name, child.id)?;
        Ok(child.id)
    }

    /// Returns the inode number of the entry named `name` in `dir`.
    pub fn lookup(&self, dir: InodeNumber, name: &str) -> Result<InodeNumber> {
        self.list(dir)?
            .into_iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.inode)
            .ok_or_else(|| FsError::NotFound(name.to_owned()))
    }

    /// Returns `dir`'s entries verbatim.
    pub fn list(&self, dir: InodeNumber) -> Result<Vec<DirectoryEntry>> {
        let inode = self.read_inode(dir)?;
        self.read_directory(&inode)
    }

    /// Adds a hard link `name → file` in `dir`. Only regular files may be
    /// linked.
    pub fn link_file(&mut self, dir: InodeNumber, name: &str, file: InodeNumber) -> Result<()> {
        let mut parent = self.read_inode(dir)?;
        if !parent.is_directory() {
            return Err(FsError::NotDirectory);
        }
        let target = self.read_inode(file)?;
        if !target.is_regular() {
            return Err(FsError::NotRegular);
        }
        self.add_entry(&mut parent, name, file)
    }

    /// Removes the entry `name` from `dir`, deallocating the target once
    /// its link count reaches zero. Directories are rejected; use
    /// [`FileSystem::rmdir`].
    pub fn unlink_file(&mut self, dir: InodeNumber, name: &str) -> Result<()> {
        if name == "." || name == ".." {
            return Err(FsError::DotDotDelete);
        }
        let mut parent = self.read_inode(dir)?;
        if !parent.is_directory() {
            return Err(FsError::NotDirectory);
        }

        let target = self.read_inode(self.lookup(dir, name)?)?;
        if target.is_directory() {
            return Err(FsError::IsDirectory);
        }

        let mut removed = self.remove_entry(&mut parent, name)?;
        if removed.link_count == 0 {
            self.deallocate_inode(&mut removed)?;
        }
        Ok(())
    }

    /// Removes the empty directory `name` from `dir`.
    ///
    /// The target must hold exactly its `"."` and `".."` entries. Those are
    /// removed first (releasing the self-link and the link to `dir`), then
    /// the entry in `dir`, at which point the target's link count reaches
    /// zero and it is deallocated.
    pub fn rmdir(&mut self, dir: InodeNumber, name: &str) -> Result<()> {
        if name == "." || name == ".." {
            return Err(FsError::DotDotDelete);
        }
        let parent = self.read_inode(dir)?;
        if !parent.is_directory() {
            return Err(FsError::NotDirectory);
        }

        let mut target = self.read_inode(self.lookup(dir, name)?)?;
        if !target.is_directory() {
            return Err(FsError::NotDirectory);
        }
        if self.read_directory(&target)?.len() != 2 {
            return Err(FsError::DirectoryNotEmpty);
        }

        self.remove_entry(&mut target, ".")?;
        self.remove_entry(&mut target, "..")?;

        // Removing ".." decremented this directory's link count on disk.
        let mut parent = self.read_inode(dir)?;
        let mut removed = self.remove_entry(&mut parent, name)?;
        if removed.link_count == 0 {
            self.deallocate_inode(&mut removed)?;
        }
        Ok(())
    }

    /// Creates a symlink named `name` in `dir` whose content is `target`.
    pub fn symlink_file(&mut self, dir: InodeNumber, name: &str, target: &str) -> Result<InodeNumber> {
        let mut parent = self.read_inode(dir)?;
        if !parent.is_directory() {
            return Err(FsError::NotDirectory);
        }

        let mut link = self.allocate_inode()?;
        link.file_type = InodeType::Symlink;
        self.write_inode(&link)?;
        self.write(&mut link, 0, target.as_bytes())?;

        self.add_entry(&mut parent, name, link.id)?;
        Ok(link.id)
    }

    /// Reports `file`'s metadata.
    pub fn stat(&self, file: InodeNumber) -> Result<Stat> {
        let inode = self.read_inode(file)?;
        let symlink_target = if inode.is_symlink() {
            Some(self.read_symlink_target(&inode)?)
        } else {
            None
        };
        Ok(Stat {
            inode: inode.id,
            file_type: inode.file_type,
            size: inode.size,
            links: inode.link_count,
            symlink_target,
        })
    }

    /// Reads from the regular file `file` at `offset`.
    pub fn read_file(&self, file: InodeNumber, offset: i64, buf: &mut [u8]) -> Result<usize> {
        let inode = self.read_inode(file)?;
        if !inode.is_regular() {
            return Err(FsError::NotRegular);
        }
        self.read(&inode, offset, buf)
    }

    /// Writes to the regular file `file` at `offset`.
    pub fn write_file(&mut self, file: InodeNumber, offset: i64, data: &[u8]) -> Result<usize> {
        let mut inode = self.read_inode(file)?;
        if !inode.is_regular() {
            return Err(FsError::NotRegular);
        }
        self.write(&mut inode, offset, data)
    }

    /// Resizes the regular file `file` to `size` bytes.
    pub fn truncate_file(&mut self, file: InodeNumber, size: i64) -> Result<()> {
        let mut inode = self.read_inode(file)?;
        if !inode.is_regular() {
            return Err(FsError::NotRegular);
        }
        self.truncate(&mut inode, size)
    }

    /// Reads a symlink's entire content as text.
    pub(crate) fn read_symlink_target(&self, inode: &Inode) -> Result<String> {
        let mut contents = vec![0u8; inode.size as usize];
        self.read(inode, 0, &mut contents)?;
        Ok(String::from_utf8_lossy(&contents).into_owned())
    }
}
