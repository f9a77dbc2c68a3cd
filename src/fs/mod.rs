/// Directory representation.
mod directory;
/// The logical byte-stream engine and the block layer.
mod io;
/// Filesystem operations over inode ids.
mod ops;
/// Hierarchical path resolution.
mod path;

pub use ops::Stat;

use log::debug;

use crate::bitmap::{BitStatus, Bitmap};
use crate::disk_format::inode::{Inode, InodeNumber, InodeType, INODE_SIZE};
use crate::disk_format::superblock::{Superblock, SUPERBLOCK_SIZE};
use crate::error::{FsError, Result};
use crate::storage::VolumeStorage;

/// A mounted volume: the backing storage plus the in-memory superblock and
/// the two bitmap allocators derived from it.
///
/// All operations are synchronous and complete before returning. The volume
/// is a single logically serialized resource; wrap the whole filesystem in a
/// mutex if it must be shared.
pub struct FileSystem<S: VolumeStorage> {
    storage: S,
    superblock: Superblock,
    inode_bitmap: Bitmap,
    block_bitmap: Bitmap,
}

impl<S: VolumeStorage> FileSystem<S> {
    /// Formats `storage` as a fresh volume with `n` requested inodes.
    ///
    /// The host is truncated to the computed size and zeroed, the root
    /// directory is allocated at inode 0 with `"."` and `".."` pointing to
    /// itself, and the superblock is flushed.
    pub fn format(storage: S, n: i64) -> Result<Self> {
        let superblock = Superblock::with_geometry(n)?;
        storage.set_len(0)?;
        storage.set_len(superblock.size as u64)?;

        let mut fs = Self::assemble(storage, superblock);

        let mut root = fs.allocate_inode()?;
        debug_assert_eq!(root.id, superblock.root);
        root.file_type = InodeType::Directory;
        fs.write_directory(&mut root, &[])?;
        let root_id = root.id;
        fs.add_entry(&mut root, ".", root_id)?;
        fs.add_entry(&mut root, "..", root_id)?;

        fs.flush_superblock()?;
        debug!(
            "formatted volume: {} inodes, {} blocks, {} bytes",
            superblock.inode_count, superblock.block_count, superblock.size
        );
        Ok(fs)
    }

    /// Mounts an existing volume, validating the superblock against the
    /// host file size.
    pub fn mount(storage: S) -> Result<Self> {
        let mut header = [0u8; SUPERBLOCK_SIZE];
        storage.read_at(0, &mut header)?;
        let superblock = Superblock::from_bytes(&header)?;
        superblock.validate(storage.len()?)?;
        debug!(
            "mounted volume: {} inodes, {} blocks",
            superblock.inode_count, superblock.block_count
        );
        Ok(Self::assemble(storage, superblock))
    }

    /// Persists the superblock and flushes the host file.
    pub fn close(self) -> Result<()> {
        self.flush_superblock()?;
        self.storage.sync()?;
        debug!("closed volume");
        Ok(())
    }

    fn assemble(storage: S, superblock: Superblock) -> Self {
        let inode_bitmap = Bitmap::new(
            superblock.inode_bitmap_offset,
            superblock.inode_count,
            "inodes",
        );
        let block_bitmap = Bitmap::new(
            superblock.block_bitmap_offset,
            superblock.block_count,
            "blocks",
        );
        FileSystem {
            storage,
            superblock,
            inode_bitmap,
            block_bitmap,
        }
    }

    fn flush_superblock(&self) -> Result<()> {
        self.storage.write_at(0, &self.superblock.to_bytes()?)
    }

    /// The volume's geometry.
    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    /// The root directory's inode number.
    pub fn root(&self) -> InodeNumber {
        self.superblock.root
    }

    /// Number of unallocated inodes.
    pub fn free_inodes(&self) -> Result<i64> {
        self.inode_bitmap.count_free(&self.storage)
    }

    /// Number of unallocated blocks.
    pub fn free_blocks(&self) -> Result<i64> {
        self.block_bitmap.count_free(&self.storage)
    }

    // ── Inode store ─────────────────────────────────────────────────────

    /// Reads the inode record for `id` and tags it with its number.
    pub fn read_inode(&self, id: InodeNumber) -> Result<Inode> {
        self.check_inode_id(id)?;
        let mut record = [0u8; INODE_SIZE];
        self.storage
            .read_at(self.superblock.inode_position(id) as u64, &mut record)?;
        Inode::from_bytes(id, &record)
    }

    /// Writes `inode`'s record back to the inode table.
    pub fn write_inode(&self, inode: &Inode) -> Result<()> {
        self.check_inode_id(inode.id)?;
        self.storage.write_at(
            self.superblock.inode_position(inode.id) as u64,
            &inode.to_bytes()?,
        )
    }

    /// Claims a free inode and returns it as a blank regular file. The
    /// record is not persisted; the caller writes it once initialized.
    pub fn allocate_inode(&mut self) -> Result<Inode> {
        let id = self.inode_bitmap.find_free(&self.storage)?;
        self.inode_bitmap.set(&self.storage, id, BitStatus::Used)?;
        debug!("allocated inode {id}");
        Ok(Inode::new(id, InodeType::Regular))
    }

    /// Releases `inode`: truncating to zero frees its blocks and persists
    /// the record, then the bitmap bit is cleared.
    pub fn deallocate_inode(&mut self, inode: &mut Inode) -> Result<()> {
        self.truncate(inode, 0)?;
        self.inode_bitmap
            .set(&self.storage, inode.id, BitStatus::Free)?;
        debug!("deallocated inode {}", inode.id);
        Ok(())
    }

    fn check_inode_id(&self, id: InodeNumber) -> Result<()> {
        if id < 0 || id >= self.superblock.inode_count {
            return Err(FsError::NotFound(format!("inode {id}")));
        }
        Ok(())
    }
}
