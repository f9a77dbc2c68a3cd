use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::disk_format::block::{BlockNumber, BLOCK_SIZE};
use crate::disk_format::codec;
use crate::error::Result;

use bincode::Options;

/// The number of direct block numbers held by an inode.
pub const DIRECT_LINKS: usize = 16;

/// The number of bytes occupied by a serialized inode: a one-byte file type,
/// the link count, the size, the direct block array, and the reserved
/// indirect block number.
pub const INODE_SIZE: usize = 1 + 8 + 8 + 8 * DIRECT_LINKS + 8;
const_assert!(INODE_SIZE == 153);

/// The maximum supported file size. The indirect block field is reserved
/// and never referenced, so files are bounded by the direct block array.
pub const MAX_FILE_SIZE: usize = DIRECT_LINKS * BLOCK_SIZE;

/// Index of an inode within the inode table.
pub type InodeNumber = i64;

/// An inode. The `id` is derived from the record's position in the inode
/// table and is not part of the serialized form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inode {
    /// Inode number, tagged on after reading.
    #[serde(skip)]
    pub id: InodeNumber,
    /// File type.
    pub file_type: InodeType,
    /// Number of directory entries referring to this inode.
    pub link_count: i64,
    /// File size in bytes.
    pub size: i64,
    /// Block numbers of the file's data blocks; unused slots are zero.
    pub blocks: [BlockNumber; DIRECT_LINKS],
    /// Reserved for a future indirect block; always zero.
    pub indirect_block: BlockNumber,
}

impl Inode {
    /// Constructs a blank inode of the given type.
    pub fn new(id: InodeNumber, file_type: InodeType) -> Self {
        Inode {
            id,
            file_type,
            link_count: 0,
            size: 0,
            blocks: [0; DIRECT_LINKS],
            indirect_block: 0,
        }
    }

    /// The number of blocks occupied by the first `size` bytes of a file.
    pub fn blocks_spanned(size: i64) -> i64 {
        (size + BLOCK_SIZE as i64 - 1) / BLOCK_SIZE as i64
    }

    /// Whether this inode is a directory.
    pub fn is_directory(&self) -> bool {
        self.file_type == InodeType::Directory
    }

    /// Whether this inode is a regular file.
    pub fn is_regular(&self) -> bool {
        self.file_type == InodeType::Regular
    }

    /// Whether this inode is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.file_type == InodeType::Symlink
    }

    /// Serializes the inode into its 153-byte on-disk form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let bytes = codec().serialize(self)?;
        debug_assert_eq!(bytes.len(), INODE_SIZE);
        Ok(bytes)
    }

    /// Deserializes an inode record, tagging it with `id`.
    pub fn from_bytes(id: InodeNumber, bytes: &[u8]) -> Result<Self> {
        let mut inode: Inode = codec().deserialize(bytes)?;
        inode.id = id;
        Ok(inode)
    }
}

/// The type of an inode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum InodeType {
    /// A directory.
    Directory = 0,
    /// A regular data file.
    Regular = 1,
    /// A symbolic link.
    Symlink = 2,
}
