use crate::disk_format::directory_entry::{
    decode_entries, encode_entries, validate_name, DirectoryEntry,
};
use crate::disk_format::inode::{Inode, InodeNumber, InodeType};
use crate::error::{FsError, Result};
use crate::storage::VolumeStorage;

use super::FileSystem;

impl<S: VolumeStorage> FileSystem<S> {
    /// Claims a fresh inode, marks it a directory, and persists it with an
    /// empty entry list so its contents always parse.
    pub(crate) fn allocate_directory(&mut self) -> Result<Inode> {
        let mut inode = self.allocate_inode()?;
        inode.file_type = InodeType::Directory;
        self.write_directory(&mut inode, &[])?;
        Ok(inode)
    }

    /// Parses `dir`'s contents into its entry list.
    pub(crate) fn read_directory(&self, dir: &Inode) -> Result<Vec<DirectoryEntry>> {
        if !dir.is_directory() {
            return Err(FsError::NotDirectory);
        }
        let mut contents = vec![0u8; dir.size as usize];
        self.read(dir, 0, &mut contents)?;
        decode_entries(&contents)
    }

    /// Replaces `dir`'s contents with the serialized entry list.
    pub(crate) fn write_directory(
        &mut self,
        dir: &mut Inode,
        entries: &[DirectoryEntry],
    ) -> Result<()> {
        if !dir.is_directory() {
            return Err(FsError::NotDirectory);
        }
        let contents = encode_entries(entries);
        self.truncate(dir, 0)?;
        self.write(dir, 0, &contents)?;
        Ok(())
    }

    /// Appends an entry `name → file` to `dir` and increments the target's
    /// link count.
    ///
    /// When the entry refers to `dir` itself (the `"."` case) the caller's
    /// copy is updated in place; otherwise the target record is re-read
    /// from the inode table, so any caller-held copy of it goes stale.
    pub(crate) fn add_entry(
        &mut self,
        dir: &mut Inode,
        name: &str,
        file: InodeNumber,
    ) -> Result<()> {
        if !dir.is_directory() {
            return Err(FsError::NotDirectory);
        }
        validate_name(name)?;

        let mut entries = self.read_directory(dir)?;
        if entries.iter().any(|entry| entry.name == name) {
            return Err(FsError::AlreadyExists(name.to_owned()));
        }
        entries.push(DirectoryEntry::new(name, file)?);
        self.write_directory(dir, &entries)?;

        if file == dir.id {
            dir.link_count += 1;
            self.write_inode(dir)
        } else {
            let mut target = self.read_inode(file)?;
            target.link_count += 1;
            self.write_inode(&target)
        }
    }

    /// Removes the first entry named `name` from `dir`, decrements the
    /// target's link count, and returns the updated target inode.
    pub(crate) fn remove_entry(&mut self, dir: &mut Inode, name: &str) -> Result<Inode> {
        if !dir.is_directory() {
            return Err(FsError::NotDirectory);
        }

        let mut entries = self.read_directory(dir)?;
        let position = entries
            .iter()
            .position(|entry| entry.name == name)
            .ok_or_else(|| FsError::NotFound(name.to_owned()))?;
        let removed = entries.remove(position);
        self.write_directory(dir, &entries)?;

        if removed.inode == dir.id {
            dir.link_count -= 1;
            self.write_inode(dir)?;
            Ok(*dir)
        } else {
            let mut target = self.read_inode(removed.inode)?;
            target.link_count -= 1;
            self.write_inode(&target)?;
            Ok(target)
        }
    }
}
