use std::fs::File;
use std::os::unix::prelude::FileExt;

use crate::error::Result;

use super::volume_storage::VolumeStorage;

/// Volume storage backed by one host file.
pub struct FileBackedStorage(File);

impl FileBackedStorage {
    /// Wraps an open host file.
    pub fn new(file: File) -> Self {
        FileBackedStorage(file)
    }
}

impl VolumeStorage for FileBackedStorage {
    fn read_at(&self, position: u64, buf: &mut [u8]) -> Result<()> {
        self.0.read_exact_at(buf, position)?;
        Ok(())
    }

    fn write_at(&self, position: u64, buf: &[u8]) -> Result<()> {
        self.0.write_all_at(buf, position)?;
        Ok(())
    }

    fn set_len(&self, len: u64) -> Result<()> {
        self.0.set_len(len)?;
        Ok(())
    }

    fn len(&self) -> Result<u64> {
        Ok(self.0.metadata()?.len())
    }

    fn sync(&self) -> Result<()> {
        self.0.sync_all()?;
        Ok(())
    }
}
