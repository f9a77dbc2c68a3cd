use serde::{Deserialize, Serialize};

use crate::disk_format::block::BLOCK_SIZE;
use crate::disk_format::codec;
use crate::disk_format::inode::{InodeNumber, INODE_SIZE};
use crate::error::{FsError, Result};

use bincode::Options;

/// The number of bytes occupied by the serialized superblock. The volume's
/// inode bitmap begins at this offset.
pub const SUPERBLOCK_SIZE: usize = 64;
const_assert!(SUPERBLOCK_SIZE == 8 * 8);

/// The inode number of the root directory.
pub const ROOT_INODE: InodeNumber = 0;

/// The superblock: authoritative geometry of the volume, serialized at host
/// file offset 0 as eight big-endian signed 64-bit fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Superblock {
    /// Total size of the volume in bytes.
    pub size: i64,
    /// Byte offset of the inode bitmap.
    pub inode_bitmap_offset: i64,
    /// Byte offset of the block bitmap.
    pub block_bitmap_offset: i64,
    /// Byte offset of the inode table.
    pub inodes_offset: i64,
    /// Byte offset of the data region.
    pub blocks_offset: i64,
    /// Number of inodes in the inode table. Always a multiple of 8.
    pub inode_count: i64,
    /// Number of blocks in the data region.
    pub block_count: i64,
    /// Inode number of the root directory.
    pub root: i64,
}

impl Superblock {
    /// Computes the geometry for a volume with `n` requested inodes.
    ///
    /// The inode count is rounded up to a multiple of 8 so the inode bitmap
    /// has no partial final byte; the block count is derived from it. The
    /// regions are laid out back to back: superblock, inode bitmap, block
    /// bitmap, inode table, data region.
    pub fn with_geometry(n: i64) -> Result<Self> {
        if n <= 0 {
            return Err(FsError::Format(format!(
                "inode count must be positive, got {n}"
            )));
        }

        let inode_count = ((n + 7) / 8) * 8;
        let block_count = 10 + 10 * inode_count;

        let inode_bitmap_offset = SUPERBLOCK_SIZE as i64;
        let block_bitmap_offset = inode_bitmap_offset + inode_count / 8;
        let inodes_offset = block_bitmap_offset + (block_count + 7) / 8;
        let blocks_offset = inodes_offset + inode_count * INODE_SIZE as i64;
        let size = blocks_offset + block_count * BLOCK_SIZE as i64;

        Ok(Superblock {
            size,
            inode_bitmap_offset,
            block_bitmap_offset,
            inodes_offset,
            blocks_offset,
            inode_count,
            block_count,
            root: ROOT_INODE,
        })
    }

    /// Checks that the recorded offsets are monotonically increasing and
    /// that every region fits within `host_len` bytes of backing storage.
    pub fn validate(&self, host_len: u64) -> Result<()> {
        let ordered = SUPERBLOCK_SIZE as i64 <= self.inode_bitmap_offset
            && self.inode_bitmap_offset < self.block_bitmap_offset
            && self.block_bitmap_offset < self.inodes_offset
            && self.inodes_offset < self.blocks_offset;
        if !ordered {
            return Err(FsError::Format(format!(
                "superblock offsets are not monotonically increasing: {self:?}"
            )));
        }
        if self.inode_count <= 0 || self.block_count <= 0 {
            return Err(FsError::Format(format!(
                "non-positive inode or block count: {self:?}"
            )));
        }
        let data_end = self.blocks_offset + self.block_count * BLOCK_SIZE as i64;
        if data_end > self.size {
            return Err(FsError::Format(format!(
                "data region ends at {data_end} past recorded size {}",
                self.size
            )));
        }
        if self.size as u64 > host_len {
            return Err(FsError::Format(format!(
                "volume size {} exceeds host file size {host_len}",
                self.size
            )));
        }
        if self.root < 0 || self.root >= self.inode_count {
            return Err(FsError::Format(format!(
                "root inode {} out of range",
                self.root
            )));
        }
        Ok(())
    }

    /// Byte offset of inode `id` within the host file.
    pub fn inode_position(&self, id: InodeNumber) -> i64 {
        self.inodes_offset + id * INODE_SIZE as i64
    }

    /// Byte offset of data block `block` within the host file.
    pub fn block_position(&self, block: i64) -> i64 {
        self.blocks_offset + block * BLOCK_SIZE as i64
    }

    /// Serializes the superblock into its 64-byte on-disk form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let bytes = codec().serialize(self)?;
        debug_assert_eq!(bytes.len(), SUPERBLOCK_SIZE);
        Ok(bytes)
    }

    /// Deserializes a superblock from its on-disk form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(codec().deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_rounds_inode_count_up() {
        let sb = Superblock::with_geometry(10).unwrap();
        assert_eq!(sb.inode_count, 16);
        assert_eq!(sb.block_count, 10 + 10 * 16);

        let sb = Superblock::with_geometry(16).unwrap();
        assert_eq!(sb.inode_count, 16);
    }

    #[test]
    fn geometry_lays_regions_back_to_back() {
        let sb = Superblock::with_geometry(16).unwrap();
        assert_eq!(sb.inode_bitmap_offset, 64);
        assert_eq!(sb.block_bitmap_offset, 64 + 2);
        // 170 blocks need 22 bitmap bytes.
        assert_eq!(sb.inodes_offset, 66 + 22);
        assert_eq!(sb.blocks_offset, 88 + 16 * INODE_SIZE as i64);
        assert_eq!(
            sb.size,
            sb.blocks_offset + sb.block_count * BLOCK_SIZE as i64
        );
        sb.validate(sb.size as u64).unwrap();
    }

    #[test]
    fn geometry_rejects_non_positive_counts() {
        assert!(Superblock::with_geometry(0).is_err());
        assert!(Superblock::with_geometry(-3).is_err());
    }

    #[test]
    fn serializes_as_eight_big_endian_fields() {
        let sb = Superblock::with_geometry(8).unwrap();
        let bytes = sb.to_bytes().unwrap();
        assert_eq!(bytes.len(), SUPERBLOCK_SIZE);

        let expected: Vec<u8> = [
            sb.size,
            sb.inode_bitmap_offset,
            sb.block_bitmap_offset,
            sb.inodes_offset,
            sb.blocks_offset,
            sb.inode_count,
            sb.block_count,
            sb.root,
        ]
        .iter()
        .flat_map(|field| field.to_be_bytes())
        .collect();
        assert_eq!(bytes, expected);

        assert_eq!(Superblock::from_bytes(&bytes).unwrap(), sb);
    }

    #[test]
    fn validate_rejects_shuffled_offsets() {
        let mut sb = Superblock::with_geometry(8).unwrap();
        std::mem::swap(&mut sb.inode_bitmap_offset, &mut sb.inodes_offset);
        assert!(sb.validate(sb.size as u64).is_err());
    }

    #[test]
    fn validate_rejects_truncated_host_file() {
        let sb = Superblock::with_geometry(8).unwrap();
        assert!(sb.validate(sb.size as u64 - 1).is_err());
    }
}
