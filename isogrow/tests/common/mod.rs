//! Common test utilities and mock block devices

pub mod builder;
#[allow(unused_imports)]
pub use builder::IsoBuilder;

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use std::io;

/// Logical sector size used by the builder
pub const SECTOR: usize = 2048;

/// In-memory block device for testing
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    pub data: Vec<u8>,
    pub block_size: usize,
    pub flushes: usize,
}

impl MemoryBlockDevice {
    /// Create a new memory block device from raw data
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_block_size(data, SECTOR)
    }

    /// Create a device reporting a smaller block size
    pub fn with_block_size(data: Vec<u8>, block_size: usize) -> Self {
        Self {
            data,
            block_size,
            flushes: 0,
        }
    }

    /// Bytes at an absolute device offset
    #[allow(dead_code)]
    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Little-endian u32 at an absolute device offset
    #[allow(dead_code)]
    pub fn le_u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.data[offset..offset + 4].try_into().unwrap())
    }

    /// Big-endian u32 at an absolute device offset
    #[allow(dead_code)]
    pub fn be_u32(&self, offset: usize) -> u32 {
        u32::from_be_bytes(self.data[offset..offset + 4].try_into().unwrap())
    }
}

impl BlockIo for MemoryBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.block_size as u32).expect("valid block size")
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.data.len() / self.block_size) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + dst.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read beyond end of device",
            ));
        }
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + src.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write beyond end of device",
            ));
        }
        self.data[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}
