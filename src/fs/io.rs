use log::trace;

use crate::bitmap::BitStatus;
use crate::disk_format::block::{BlockNumber, BLOCK_SIZE};
use crate::disk_format::inode::{Inode, MAX_FILE_SIZE};
use crate::error::{FsError, Result};
use crate::storage::VolumeStorage;

use super::FileSystem;

impl<S: VolumeStorage> FileSystem<S> {
    // ── Block layer ─────────────────────────────────────────────────────

    /// Claims a free block, zeroes it, and returns its number.
    pub(crate) fn allocate_block(&mut self) -> Result<BlockNumber> {
        let block = self.block_bitmap.find_free(&self.storage)?;
        self.block_bitmap
            .set(&self.storage, block, BitStatus::Used)?;
        self.clear_block(block)?;
        trace!("allocated block {block}");
        Ok(block)
    }

    /// Releases a block by clearing its bitmap bit.
    pub(crate) fn free_block(&mut self, block: BlockNumber) -> Result<()> {
        self.block_bitmap
            .set(&self.storage, block, BitStatus::Free)?;
        trace!("freed block {block}");
        Ok(())
    }

    /// Overwrites a block with zeroes.
    fn clear_block(&mut self, block: BlockNumber) -> Result<()> {
        self.storage.write_at(
            self.superblock.block_position(block) as u64,
            &[0u8; BLOCK_SIZE],
        )
    }

    /// Writes as much of `buf` as fits in `block` starting at intra-block
    /// offset `offset`, returning the unconsumed tail.
    fn write_to_block<'a>(
        &mut self,
        block: BlockNumber,
        offset: i64,
        buf: &'a [u8],
    ) -> Result<&'a [u8]> {
        let count = (BLOCK_SIZE as i64 - offset).min(buf.len() as i64) as usize;
        let position = self.superblock.block_position(block) + offset;
        self.storage.write_at(position as u64, &buf[..count])?;
        Ok(&buf[count..])
    }

    /// Reads from `block` starting at intra-block offset `offset` into the
    /// head of `buf`, returning the number of bytes read.
    fn read_from_block(&self, block: BlockNumber, offset: i64, buf: &mut [u8]) -> Result<usize> {
        let count = (BLOCK_SIZE as i64 - offset).min(buf.len() as i64) as usize;
        let position = self.superblock.block_position(block) + offset;
        self.storage.read_at(position as u64, &mut buf[..count])?;
        Ok(count)
    }

    // ── Byte-stream engine ──────────────────────────────────────────────

    /// Reads up to `buf.len()` bytes of `inode`'s contents starting at
    /// `offset`, returning the number of bytes read. Reads starting at or
    /// past the end of the file return 0.
    pub fn read(&self, inode: &Inode, offset: i64, buf: &mut [u8]) -> Result<usize> {
        if offset < 0 {
            return Err(FsError::Format(format!("negative read offset {offset}")));
        }
        if offset >= inode.size {
            return Ok(0);
        }

        let n = (buf.len() as i64).min(inode.size - offset) as usize;
        let buf = &mut buf[..n];

        let mut index = (offset / BLOCK_SIZE as i64) as usize;
        let mut block_offset = offset % BLOCK_SIZE as i64;
        let mut filled = 0;
        while filled < n {
            filled += self.read_from_block(inode.blocks[index], block_offset, &mut buf[filled..])?;
            block_offset = 0;
            index += 1;
        }
        Ok(n)
    }

    /// Writes all of `data` into `inode`'s contents at `offset`, allocating
    /// blocks to cover the new extent, and persists the updated record.
    /// Returns the number of bytes written.
    pub fn write(&mut self, inode: &mut Inode, offset: i64, data: &[u8]) -> Result<usize> {
        if offset < 0 {
            return Err(FsError::Format(format!("negative write offset {offset}")));
        }
        let end = offset + data.len() as i64;
        if end > MAX_FILE_SIZE as i64 {
            return Err(FsError::FileTooLarge);
        }

        // Growth is contiguous from the current tail, so every block in
        // [0, blocks_spanned(end)) ends up allocated.
        let mut old = Inode::blocks_spanned(inode.size);
        let new = Inode::blocks_spanned(end);
        while old < new {
            inode.blocks[old as usize] = self.allocate_block()?;
            old += 1;
        }

        let mut index = (offset / BLOCK_SIZE as i64) as usize;
        let mut block_offset = offset % BLOCK_SIZE as i64;
        let mut rest = data;
        while !rest.is_empty() {
            rest = self.write_to_block(inode.blocks[index], block_offset, rest)?;
            block_offset = 0;
            index += 1;
        }

        if end > inode.size {
            inode.size = end;
        }
        self.write_inode(inode)?;
        Ok(data.len())
    }

    /// Resizes `inode`'s contents to `size` bytes and persists the record.
    ///
    /// Growing allocates zeroed blocks without writing user data; shrinking
    /// frees the blocks past the new extent in descending order and zeroes
    /// their slots.
    pub fn truncate(&mut self, inode: &mut Inode, size: i64) -> Result<()> {
        if size < 0 {
            return Err(FsError::Format(format!("negative truncate size {size}")));
        }
        if size > MAX_FILE_SIZE as i64 {
            return Err(FsError::FileTooLarge);
        }

        let mut old = Inode::blocks_spanned(inode.size);
        let new = Inode::blocks_spanned(size);
        if size > inode.size {
            while old < new {
                inode.blocks[old as usize] = self.allocate_block()?;
                old += 1;
            }
        } else if size < inode.size {
            while new < old {
                let index = (old - 1) as usize;
                self.free_block(inode.blocks[index])?;
                inode.blocks[index] = 0;
                old -= 1;
            }
        }

        inode.size = size;
        self.write_inode(inode)
    }
}
