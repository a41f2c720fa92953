//! Stream handle handed to file transforms
//!
//! A [`FileCursor`] starts at a file's first data byte but can reach the
//! whole medium, so transforms that scan ahead (or patch an embedded
//! filesystem) can do so. The growth ceiling is the transform's to respect;
//! [`FileCursor::check_growth`] is the check it is expected to make.

use crate::directory::record::File;
use crate::error::{Error, Result};
use crate::medium::Medium;
use gpt_disk_io::BlockIo;

/// Positioned byte stream over the medium
pub struct FileCursor<'a, B: BlockIo> {
    medium: &'a mut Medium<B>,
    file: File,
    data_start: u64,
    position: u64,
}

impl<'a, B: BlockIo> FileCursor<'a, B> {
    /// Create a cursor positioned at the first data byte of `file`
    pub fn new(medium: &'a mut Medium<B>, file: File) -> Self {
        let data_start = file.data_offset();
        Self {
            medium,
            file,
            data_start,
            position: data_start,
        }
    }

    /// File this cursor was opened for, with its authoritative size
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Byte offset of the file's first data byte
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Byte offset one past the file's original content
    pub fn data_end(&self) -> u64 {
        self.data_start + u64::from(self.file.size)
    }

    /// Largest position the file's content may extend to in place
    pub fn growth_limit(&self) -> u64 {
        self.data_end() + u64::from(self.file.max_growth())
    }

    /// Fail unless the file can grow by `growth` bytes without moving
    pub fn check_growth(&self, growth: u32) -> Result<()> {
        let max = self.file.max_growth();
        if growth > max {
            log::warn!("{}: growth of {growth} exceeds slack of {max}", self.file.name);
            return Err(Error::GrowthExceedsSlack { growth, max });
        }
        Ok(())
    }

    /// Current position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Seek to an absolute position on the medium
    pub fn seek(&mut self, position: u64) -> Result<()> {
        if position > self.medium.len() {
            return Err(Error::EndOfMedium { position });
        }
        self.position = position;
        Ok(())
    }

    /// Seek relative to the current position
    pub fn seek_relative(&mut self, delta: i64) -> Result<()> {
        let target = self
            .position
            .checked_add_signed(delta)
            .ok_or(Error::EndOfMedium { position: 0 })?;
        self.seek(target)
    }

    /// Return to the first data byte
    pub fn rewind(&mut self) {
        self.position = self.data_start;
    }

    /// Read bytes at current position, short only at the end of the medium
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let available = self.medium.len().saturating_sub(self.position);
        let count = (buffer.len() as u64).min(available) as usize;
        self.medium.read_at(self.position, &mut buffer[..count])?;
        self.position += count as u64;
        Ok(count)
    }

    /// Read exact number of bytes (error if not available)
    pub fn read_exact(&mut self, buffer: &mut [u8]) -> Result<()> {
        let end = self.position + buffer.len() as u64;
        if end > self.medium.len() {
            return Err(Error::EndOfMedium { position: end });
        }
        self.read(buffer).map(|_| ())
    }

    /// Read the file's original content, exactly `size` bytes
    pub fn read_content(&mut self) -> Result<alloc::vec::Vec<u8>> {
        let size = self.file.size;
        let available = self.medium.len().saturating_sub(self.data_start);
        if u64::from(size) > available {
            return Err(Error::SizeMismatch {
                expected: size,
                actual: available,
            });
        }
        let mut content = alloc::vec![0u8; size as usize];
        self.rewind();
        self.read_exact(&mut content)?;
        Ok(content)
    }

    /// Write bytes at current position, short only at the end of the medium
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        let available = self.medium.len().saturating_sub(self.position);
        let count = (data.len() as u64).min(available) as usize;
        self.medium.write_at(self.position, &data[..count])?;
        self.position += count as u64;
        Ok(count)
    }

    /// Write all of `data` at the current position
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.medium.write_at(self.position, data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    /// Flush the underlying device
    pub fn flush(&mut self) -> Result<()> {
        self.medium.flush()
    }
}
