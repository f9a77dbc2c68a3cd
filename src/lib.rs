#![warn(missing_docs)]

//! A single-user Unix-style inode filesystem persisted inside one host file.
//!
//! The volume is laid out back to back: superblock, inode bitmap, block
//! bitmap, inode table, data region. On top of the on-disk format sit the
//! bitmap allocators, the inode store, a logical byte-stream engine over
//! each inode's direct block array, JSON-encoded directories, hard links
//! and symlinks, and a hierarchical path resolver. A [`Session`] adds the
//! per-process working directory and open-file table that the interactive
//! shell drives.

/// Bitmap allocators over the inode and block bitmaps.
mod bitmap;
/// Constants and structures that define the on-disk format.
mod disk_format;
/// The crate's error type.
mod error;
/// The mounted volume and its operations.
mod fs;
/// Per-process session state and the command surface.
mod session;
/// Implementations of positioned I/O over a host file.
pub mod storage;

pub use disk_format::block::{BlockNumber, BLOCK_SIZE};
pub use disk_format::directory_entry::DirectoryEntry;
pub use disk_format::inode::{
    Inode, InodeNumber, InodeType, DIRECT_LINKS, INODE_SIZE, MAX_FILE_SIZE,
};
pub use disk_format::superblock::{Superblock, ROOT_INODE, SUPERBLOCK_SIZE};
pub use error::{FsError, Result};
pub use fs::{FileSystem, Stat};
pub use session::{Fkey, Session};
