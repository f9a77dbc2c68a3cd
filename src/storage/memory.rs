use std::io;
use std::sync::Mutex;

use crate::error::Result;

use super::volume_storage::VolumeStorage;

/// Volume storage backed by a byte vector. Behaves like a regular file:
/// reads past the end fail, writes past the end extend.
#[derive(Debug, Default)]
pub struct MemoryStorage(Mutex<Vec<u8>>);

impl MemoryStorage {
    /// An empty in-memory host.
    pub fn new() -> Self {
        Self::default()
    }
}

impl VolumeStorage for MemoryStorage {
    fn read_at(&self, position: u64, buf: &mut [u8]) -> Result<()> {
        let data = self.0.lock().unwrap();
        let start = position as usize;
        let end = start + buf.len();
        if end > data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("read of {}..{} past end {}", start, end, data.len()),
            )
            .into());
        }
        buf.copy_from_slice(&data[start..end]);
        Ok(())
    }

    fn write_at(&self, position: u64, buf: &[u8]) -> Result<()> {
        let mut data = self.0.lock().unwrap();
        let start = position as usize;
        let end = start + buf.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn set_len(&self, len: u64) -> Result<()> {
        self.0.lock().unwrap().resize(len as usize, 0);
        Ok(())
    }

    fn len(&self) -> Result<u64> {
        Ok(self.0.lock().unwrap().len() as u64)
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}
