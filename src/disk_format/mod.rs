/// Perform a const assertion.
macro_rules! const_assert {
    ($($tt:tt)*) => {
        const _: () = assert!($($tt)*);
    }
}

/// Data blocks.
pub(crate) mod block;
/// Directory entries.
pub(crate) mod directory_entry;
/// Inodes.
pub(crate) mod inode;
/// The superblock.
pub(crate) mod superblock;

use bincode::Options;

/// The bincode configuration shared by every on-disk record: fixed-width
/// integers, big-endian, no length prefixes.
pub(crate) fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
        .allow_trailing_bytes()
}
