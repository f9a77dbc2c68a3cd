use serde::{Deserialize, Serialize};

use crate::disk_format::inode::InodeNumber;
use crate::error::{FsError, Result};

/// One directory entry. A directory's contents is the JSON array of its
/// entries, e.g. `[{"name":".","inode":0},{"name":"..","inode":0}]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Entry name. Any bytes other than `/`; never empty.
    pub name: String,
    /// Inode number the entry refers to.
    pub inode: InodeNumber,
}

impl DirectoryEntry {
    /// Constructs an entry, rejecting unrepresentable names.
    pub fn new(name: &str, inode: InodeNumber) -> Result<Self> {
        validate_name(name)?;
        Ok(DirectoryEntry {
            name: name.to_owned(),
            inode,
        })
    }
}

/// Rejects names the path resolver cannot represent.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(FsError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// Serializes an entry list into directory contents.
pub fn encode_entries(entries: &[DirectoryEntry]) -> Vec<u8> {
    serde_json::to_vec(entries).expect("entry lists always serialize")
}

/// Parses directory contents into an entry list.
pub fn decode_entries(bytes: &[u8]) -> Result<Vec<DirectoryEntry>> {
    serde_json::from_slice(bytes).map_err(FsError::CorruptDirectory)
}
