//! File extent management
//!
//! Extents represent contiguous data regions on disk.

use crate::utils::sector;

/// File extent (contiguous data region)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Starting LBA
    pub lba: u32,

    /// Length in bytes
    pub length: u32,

    /// Sector-aligned extended attribute record preceding the data
    pub extended_attribute_length: u32,
}

impl Extent {
    /// Create new extent
    pub fn new(lba: u32, length: u32, extended_attribute_length: u32) -> Self {
        Self {
            lba,
            length,
            extended_attribute_length,
        }
    }

    /// Byte offset of the first data byte
    pub fn data_offset(&self) -> u64 {
        sector::sector_to_byte(self.lba) + u64::from(self.extended_attribute_length)
    }

    /// Byte offset one past the last data byte
    pub fn data_end(&self) -> u64 {
        self.data_offset() + u64::from(self.length)
    }
}
