//! Byte-addressable access to the image on a block device
//!
//! Positions are relative to the first byte of the image, which sits
//! `start_sector` logical sectors into the device. Unaligned writes are
//! read-modify-write of whole logical sectors.

use crate::error::{Error, Result};
use crate::types::SECTOR_SIZE;
use core::fmt::Debug;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

/// Image medium backed by a block device
pub struct Medium<B: BlockIo> {
    io: B,
    start_sector: u64,
    blocks_per_sector: u64,
    len: u64,
}

impl<B: BlockIo> Medium<B> {
    /// Wrap a block device whose image starts `start_sector` sectors in
    ///
    /// The device block size must divide the 2048-byte logical sector.
    pub fn new(mut io: B, start_sector: u64) -> Result<Self> {
        let block_size = io.block_size().to_u32();
        if block_size == 0 || SECTOR_SIZE as u32 % block_size != 0 {
            return Err(Error::UnsupportedBlockSize { size: block_size });
        }
        let blocks = io.num_blocks().map_err(io_error(0))?;
        let device_len = blocks * u64::from(block_size);
        let len = device_len.saturating_sub(start_sector * SECTOR_SIZE as u64);
        log::debug!("medium: {blocks} blocks of {block_size} bytes, image length {len}");

        Ok(Self {
            io,
            start_sector,
            blocks_per_sector: u64::from(SECTOR_SIZE as u32 / block_size),
            len,
        })
    }

    /// Image length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the image is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read one logical sector
    pub fn read_sector(&mut self, sector: u64, buffer: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        let lba = self.lba_of(sector)?;
        self.io.read_blocks(Lba(lba), buffer).map_err(io_error(lba))
    }

    /// Write one logical sector
    pub fn write_sector(&mut self, sector: u64, buffer: &[u8; SECTOR_SIZE]) -> Result<()> {
        let lba = self.lba_of(sector)?;
        self.io.write_blocks(Lba(lba), buffer).map_err(io_error(lba))
    }

    /// Fill `buffer` from byte `position`
    pub fn read_at(&mut self, position: u64, buffer: &mut [u8]) -> Result<()> {
        self.check_span(position, buffer.len())?;
        let mut sector_buf = [0u8; SECTOR_SIZE];
        let mut done = 0;
        while done < buffer.len() {
            let current = position + done as u64;
            let sector = current / SECTOR_SIZE as u64;
            let offset = (current % SECTOR_SIZE as u64) as usize;
            let count = (buffer.len() - done).min(SECTOR_SIZE - offset);

            self.read_sector(sector, &mut sector_buf)?;
            buffer[done..done + count].copy_from_slice(&sector_buf[offset..offset + count]);
            done += count;
        }
        Ok(())
    }

    /// Write `data` at byte `position`
    pub fn write_at(&mut self, position: u64, data: &[u8]) -> Result<()> {
        self.check_span(position, data.len())?;
        let mut sector_buf = [0u8; SECTOR_SIZE];
        let mut done = 0;
        while done < data.len() {
            let current = position + done as u64;
            let sector = current / SECTOR_SIZE as u64;
            let offset = (current % SECTOR_SIZE as u64) as usize;
            let count = (data.len() - done).min(SECTOR_SIZE - offset);

            if count < SECTOR_SIZE {
                self.read_sector(sector, &mut sector_buf)?;
            }
            sector_buf[offset..offset + count].copy_from_slice(&data[done..done + count]);
            self.write_sector(sector, &sector_buf)?;
            done += count;
        }
        Ok(())
    }

    /// Flush the device
    pub fn flush(&mut self) -> Result<()> {
        self.io.flush().map_err(io_error(0))
    }

    /// Borrow the device
    pub fn get_ref(&self) -> &B {
        &self.io
    }

    /// Give the device back
    pub fn into_inner(self) -> B {
        self.io
    }

    fn lba_of(&self, sector: u64) -> Result<u64> {
        let end = (sector + 1) * SECTOR_SIZE as u64;
        if end > self.len {
            return Err(Error::EndOfMedium { position: end });
        }
        Ok((self.start_sector + sector) * self.blocks_per_sector)
    }

    fn check_span(&self, position: u64, len: usize) -> Result<()> {
        let end = position.saturating_add(len as u64);
        if end > self.len {
            return Err(Error::EndOfMedium { position: end });
        }
        Ok(())
    }
}

/// Map a device error, keeping its detail in the log
fn io_error<E: Debug>(lba: u64) -> impl FnOnce(E) -> Error {
    move |err| {
        log::error!("block device error at LBA {lba}: {err:?}");
        Error::Io { lba }
    }
}
