use thiserror::Error;

/// Unified error type for all volume operations.
///
/// Lower-layer errors bubble up unchanged; nothing is retried. A failed
/// multi-step operation leaves the volume in whatever intermediate state it
/// reached.
#[derive(Debug, Error)]
pub enum FsError {
    /// A backing-store read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk geometry or a record is malformed.
    #[error("invalid on-disk format: {0}")]
    Format(String),

    /// No free inode or block is left.
    #[error("no free {0} left on volume")]
    OutOfSpace(&'static str),

    /// A name or inode is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The name already exists in the directory.
    #[error("file exists: {0}")]
    AlreadyExists(String),

    /// The operation applies to non-directories only.
    #[error("is a directory")]
    IsDirectory,

    /// The operation requires a directory.
    #[error("not a directory")]
    NotDirectory,

    /// The operation requires a regular file.
    #[error("not a regular file")]
    NotRegular,

    /// Attempt to unlink `"."` or `".."`.
    #[error("refusing to unlink \".\" or \"..\"")]
    DotDotDelete,

    /// `rmdir` on a directory that still has entries.
    #[error("directory not empty")]
    DirectoryNotEmpty,

    /// Path resolution expanded more than the allowed number of symlinks.
    #[error("too many levels of symbolic links")]
    TooManySymlinks,

    /// A write or truncate would exceed the direct-block maximum.
    #[error("file size exceeds direct-block maximum")]
    FileTooLarge,

    /// A name that is empty or contains `/`.
    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    /// The key does not name an open file in this session.
    #[error("unknown file descriptor: {0}")]
    UnknownFd(String),

    /// Directory contents did not parse.
    #[error("corrupt directory content: {0}")]
    CorruptDirectory(serde_json::Error),
}

impl From<bincode::Error> for FsError {
    fn from(err: bincode::Error) -> Self {
        FsError::Format(err.to_string())
    }
}

/// Result alias using [`FsError`].
pub type Result<T> = std::result::Result<T, FsError>;
