//! Bounded field decoding
//!
//! Every on-disk structure is decoded through a [`ByteView`], which carries
//! its own bound and rejects reads past it instead of trusting fixed offsets.

use crate::error::{Error, Result};
use crate::types::Endian;
use alloc::string::String;

/// Immutable view into sector data with an explicit bound
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    /// Wrap a byte slice
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Length of the view
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the view is empty
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Underlying bytes
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Borrow `len` bytes starting at `at`
    pub fn slice(&self, at: usize, len: usize) -> Result<&'a [u8]> {
        let end = at.checked_add(len).ok_or(self.out_of_range(at, len))?;
        self.data.get(at..end).ok_or(self.out_of_range(at, len))
    }

    /// Sub-view covering `len` bytes starting at `at`
    pub fn window(&self, at: usize, len: usize) -> Result<ByteView<'a>> {
        self.slice(at, len).map(ByteView::new)
    }

    /// Sub-view from `at` to the end of this view
    pub fn tail(&self, at: usize) -> Result<ByteView<'a>> {
        let len = self.data.len().checked_sub(at).ok_or(self.out_of_range(at, 0))?;
        self.window(at, len)
    }

    /// Single byte at `at`
    pub fn byte(&self, at: usize) -> Result<u8> {
        self.data.get(at).copied().ok_or(self.out_of_range(at, 1))
    }

    /// Unsigned integer of `size` bytes (1 to 8) in the given byte order
    pub fn integer(&self, at: usize, size: usize, endian: Endian) -> Result<u64> {
        if size == 0 || size > 8 {
            return Err(self.out_of_range(at, size));
        }
        let bytes = self.slice(at, size)?;
        let value = match endian {
            Endian::Big => bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
            Endian::Little => bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
        };
        Ok(value)
    }

    /// Single-endian 16-bit value
    pub fn u16(&self, at: usize, endian: Endian) -> Result<u16> {
        self.integer(at, 2, endian).map(|v| v as u16)
    }

    /// Single-endian 32-bit value
    pub fn u32(&self, at: usize, endian: Endian) -> Result<u32> {
        self.integer(at, 4, endian).map(|v| v as u32)
    }

    /// Both-endian 16-bit value (stored as LE then BE)
    ///
    /// `host` selects which redundant copy is trusted.
    pub fn both_endian_u16(&self, at: usize, host: Endian) -> Result<u16> {
        // Bound the whole pair even though only one half is decoded
        self.slice(at, 4)?;
        match host {
            Endian::Little => self.u16(at, Endian::Little),
            Endian::Big => self.u16(at + 2, Endian::Big),
        }
    }

    /// Both-endian 32-bit value (stored as LE then BE)
    pub fn both_endian_u32(&self, at: usize, host: Endian) -> Result<u32> {
        self.slice(at, 8)?;
        match host {
            Endian::Little => self.u32(at, Endian::Little),
            Endian::Big => self.u32(at + 4, Endian::Big),
        }
    }

    /// `len` bytes from `at` as a string, invalid UTF-8 replaced
    pub fn text(&self, at: usize, len: usize) -> Result<String> {
        Ok(String::from_utf8_lossy(self.slice(at, len)?).into_owned())
    }

    fn out_of_range(&self, offset: usize, len: usize) -> Error {
        Error::OutOfRange {
            offset,
            len,
            bound: self.data.len(),
        }
    }
}
