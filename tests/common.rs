//! Common helpers for integration tests.
#![allow(unused)]

use monofs::storage::MemoryStorage;
use monofs::{FileSystem, Session};

/// Formats a fresh in-memory volume with `n` requested inodes.
pub fn fresh_volume(n: i64) -> FileSystem<MemoryStorage> {
    FileSystem::format(MemoryStorage::new(), n).unwrap()
}

/// A session over a fresh in-memory volume.
pub fn fresh_session(n: i64) -> Session<MemoryStorage> {
    Session::new(fresh_volume(n))
}
