/// Size of a data block in bytes.
pub const BLOCK_SIZE: usize = 1024;

/// Index of a block within the data region.
pub type BlockNumber = i64;
