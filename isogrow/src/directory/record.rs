//! Directory Record structure
//!
//! ECMA-119 calls this a directory record, but it describes either a file
//! or a directory, so it is modelled as a [`File`].

use crate::error::{Error, Result};
use crate::file::extent::Extent;
use crate::types::{Endian, SECTOR_SIZE};
use crate::utils::bytes::ByteView;
use crate::utils::{datetime, sector};
use alloc::string::String;
use alloc::vec::Vec;
use bitflags::bitflags;

bitflags! {
    /// File flags from directory record (BP 26)
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct FileFlags: u8 {
        /// Hidden file
        const HIDDEN = 1;
        /// Directory (not a file)
        const DIRECTORY = 1 << 1;
        /// Associated file
        const ASSOCIATED = 1 << 2;
        /// Extended attribute record format
        const EXTENDED_STRUCTURE = 1 << 3;
        /// Owner/group permissions in extended attributes
        const EXTENDED_PERMISSIONS = 1 << 4;
        /// Not final directory record for this file
        const MULTIPLE_RECORDS = 1 << 7;
    }
}

/// One decoded directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Length of directory record (BP 1)
    pub record_length: u8,

    /// Extended attribute record length, rounded up to whole sectors
    pub extended_attribute_length: u32,

    /// Logical block where the data begins (BP 3-10)
    pub location: u32,

    /// Data length in bytes (BP 11-18)
    pub size: u32,

    /// Recording date and time, seconds since the epoch (BP 19-25)
    pub datetime: i64,

    /// File flags (BP 26)
    pub flags: FileFlags,

    /// File unit size for interleaved files (BP 27)
    pub file_unit_size: u8,

    /// Interleave gap size (BP 28)
    pub interleave_gap_size: u8,

    /// Volume sequence number (BP 29-32)
    pub volume_sequence_number: u16,

    /// Display name; UTF-8 once a Joliet tree has been converted
    pub name: String,

    /// File identifier exactly as recorded
    pub identifier: Vec<u8>,
}

impl File {
    /// Minimum record length
    pub const MIN_LENGTH: usize = 33;

    /// Offset of the both-endian data length inside a record
    pub const SIZE_OFFSET: usize = 10;

    /// Parse a directory record starting at the first byte of `view`
    ///
    /// System use bytes after the identifier (Rock Ridge) are not decoded.
    pub fn parse(view: ByteView<'_>, host: Endian) -> Result<Self> {
        let record_length = view.byte(0)?;
        let name_length = view.byte(32)? as usize;
        if (record_length as usize) < Self::MIN_LENGTH + name_length {
            return Err(Error::InvalidDirectoryRecord);
        }
        let record = view.window(0, record_length as usize)?;

        let extended_attribute_length = sector::align_to_sector(u64::from(record.byte(1)?)) as u32;
        let identifier = record.slice(33, name_length)?.to_vec();

        Ok(Self {
            record_length,
            extended_attribute_length,
            location: record.both_endian_u32(2, host)?,
            size: record.both_endian_u32(Self::SIZE_OFFSET, host)?,
            datetime: datetime::short_datetime(record, 18)?,
            flags: FileFlags::from_bits_retain(record.byte(25)?),
            file_unit_size: record.byte(26)?,
            interleave_gap_size: record.byte(27)?,
            volume_sequence_number: record.both_endian_u16(28, host)?,
            name: String::from_utf8_lossy(&identifier).into_owned(),
            identifier,
        })
    }

    /// Check a single flag
    pub fn has(&self, flag: FileFlags) -> bool {
        self.flags.intersects(flag)
    }

    /// Is this a directory?
    pub fn is_dir(&self) -> bool {
        self.has(FileFlags::DIRECTORY)
    }

    /// Is this the "." or ".." entry of a directory?
    pub fn is_self_or_parent(&self) -> bool {
        matches!(self.identifier.as_slice(), [0x00] | [0x01])
    }

    /// Bytes this file may grow by without moving
    ///
    /// Slack between the size and its sector boundary, less the extended
    /// attribute length. Never negative.
    pub fn max_growth(&self) -> u32 {
        let size = u64::from(self.size);
        let slack = sector::align_to_sector(size) - size;
        slack.saturating_sub(u64::from(self.extended_attribute_length)) as u32
    }

    /// Data region of this file
    pub fn extent(&self) -> Extent {
        Extent::new(self.location, self.size, self.extended_attribute_length)
    }

    /// Byte offset of the first data byte relative to the image start
    pub fn data_offset(&self) -> u64 {
        self.extent().data_offset()
    }

    /// Whether a directory record claims more than one sector of contents
    pub(crate) fn spans_sectors(&self) -> bool {
        self.size as usize > SECTOR_SIZE
    }
}

/// Both-endian encoding of a record's data length (LE copy, then BE copy)
pub fn encode_size_field(size: u32) -> [u8; 8] {
    let mut field = [0u8; 8];
    field[0..4].copy_from_slice(&size.to_le_bytes());
    field[4..8].copy_from_slice(&size.to_be_bytes());
    field
}
