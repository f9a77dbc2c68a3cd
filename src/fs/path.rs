use crate::disk_format::inode::InodeNumber;
use crate::error::{FsError, Result};
use crate::storage::VolumeStorage;

use super::FileSystem;

/// How many symlink expansions a single resolution may perform before
/// failing with `TooManySymlinks`.
const MAX_SYMLINK_DEPTH: u32 = 10;

impl<S: VolumeStorage> FileSystem<S> {
    /// Resolves `path` to an inode number, starting from `pwd` for relative
    /// paths and from the root for absolute ones.
    ///
    /// Every component is looked up in the directory reached so far;
    /// symlinks (including one in the final position) are expanded by
    /// resolving their content against the directory that contains them.
    /// The empty path resolves to `pwd`.
    pub fn resolve(&self, pwd: InodeNumber, path: &str) -> Result<InodeNumber> {
        let mut depth = 0;
        self.resolve_at(pwd, path, &mut depth)
    }

    /// Splits `path` into a directory part and a final component at the
    /// last `/`, resolves the directory part, and returns the final name
    /// together with its parent's inode number.
    pub fn resolve_parent(&self, pwd: InodeNumber, path: &str) -> Result<(String, InodeNumber)> {
        match path.rfind('/') {
            None => Ok((path.to_owned(), pwd)),
            Some(0) => Ok((path[1..].to_owned(), self.root())),
            Some(at) => {
                let parent = self.resolve(pwd, &path[..at])?;
                Ok((path[at + 1..].to_owned(), parent))
            }
        }
    }

    fn resolve_at(&self, base: InodeNumber, path: &str, depth: &mut u32) -> Result<InodeNumber> {
        if path.is_empty() {
            return Ok(base);
        }

        let (mut current, rest) = match path.strip_prefix('/') {
            Some(rest) => (self.root(), rest),
            None => (base, path),
        };

        let components: Vec<&str> = rest.split('/').collect();
        for (position, component) in components.iter().enumerate() {
            // A trailing slash leaves one final empty component behind.
            if component.is_empty() && position == components.len() - 1 {
                break;
            }

            let containing = current;
            let child = self.read_inode(self.lookup(containing, component)?)?;
            if child.is_symlink() {
                *depth += 1;
                if *depth > MAX_SYMLINK_DEPTH {
                    return Err(FsError::TooManySymlinks);
                }
                let target = self.read_symlink_target(&child)?;
                current = self.resolve_at(containing, &target, depth)?;
            } else {
                current = child.id;
            }
        }
        Ok(current)
    }
}
