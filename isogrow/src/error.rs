//! Error types for image operations

use thiserror::Error;

/// Result type for image operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while reading or patching an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Block device read or write failed
    #[error("I/O error at device block {lba}")]
    Io {
        /// First device block of the failed transfer
        lba: u64,
    },

    /// Device block size does not divide the logical sector size
    #[error("unsupported device block size of {size} bytes")]
    UnsupportedBlockSize {
        /// Reported block size
        size: u32,
    },

    /// A decode tried to read past the end of its view
    #[error("{len} bytes at offset {offset} exceed the bound of {bound} bytes")]
    OutOfRange {
        /// Start of the attempted read
        offset: usize,
        /// Length of the attempted read
        len: usize,
        /// Length of the view
        bound: usize,
    },

    /// A position beyond the end of the medium was requested
    #[error("position {position} is beyond the end of the medium")]
    EndOfMedium {
        /// Requested byte position
        position: u64,
    },

    /// Volume descriptor standard identifier is not ECMA-119
    #[error("unsupported volume descriptor identifier {0:?}")]
    UnsupportedIdentifier([u8; 5]),

    /// Path table does not fit in one logical sector
    #[error("path table of {size} bytes is larger than one sector")]
    PathTableTooLarge {
        /// Declared path table size
        size: u32,
    },

    /// Directory contents do not fit in one logical sector
    #[error("directory at sector {location} spans {size} bytes, more than one sector")]
    DirectoryTooLarge {
        /// Directory extent location
        location: u32,
        /// Declared directory size
        size: u32,
    },

    /// A directory record runs past the end of its sector
    #[error("directory record at byte {offset} of sector {location} overruns the sector")]
    RecordOverrun {
        /// Directory extent location
        location: u32,
        /// Offset of the record inside the sector
        offset: usize,
    },

    /// Directory record fields are inconsistent with its length
    #[error("corrupted directory record")]
    InvalidDirectoryRecord,

    /// Datetime digits or fields do not form a calendar date
    #[error("invalid datetime encoding")]
    InvalidDatetime,

    /// Neither a primary nor a Joliet supplementary descriptor was found
    #[error("no primary or Joliet supplementary volume descriptor found")]
    MissingVolumeDescriptor,

    /// Descriptor scan hit its limit before a set terminator
    #[error("no volume descriptor set terminator within {scanned} sectors")]
    MissingTerminator {
        /// Number of sectors scanned
        scanned: usize,
    },

    /// Resize target has no recorded directory record on the medium
    #[error("no directory record found for data at sector {location}")]
    UnknownLocation {
        /// Data location of the file
        location: u32,
    },

    /// File would grow past the slack of its last sector
    #[error("file grew by {growth} bytes but only {max} bytes of slack are available")]
    GrowthExceedsSlack {
        /// Requested growth
        growth: u32,
        /// Available slack
        max: u32,
    },

    /// Readable content is shorter than the declared file size
    #[error("file declares {expected} bytes but only {actual} could be read")]
    SizeMismatch {
        /// Declared size
        expected: u32,
        /// Bytes actually available
        actual: u64,
    },

    /// Operation requires a successful `Image::read` first
    #[error("image has not been read")]
    NotRead,
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The image uses a layout or feature this crate does not handle
    Unsupported,
    /// The medium contradicts itself or the in-memory model
    Corrupt,
    /// The block device failed
    Io,
    /// The API was used out of order or out of bounds
    Usage,
}

impl Error {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::UnsupportedBlockSize { .. }
            | Self::UnsupportedIdentifier(_)
            | Self::PathTableTooLarge { .. }
            | Self::DirectoryTooLarge { .. }
            | Self::GrowthExceedsSlack { .. } => ErrorKind::Unsupported,
            Self::RecordOverrun { .. }
            | Self::InvalidDirectoryRecord
            | Self::InvalidDatetime
            | Self::MissingVolumeDescriptor
            | Self::MissingTerminator { .. }
            | Self::UnknownLocation { .. }
            | Self::SizeMismatch { .. } => ErrorKind::Corrupt,
            Self::OutOfRange { .. } | Self::EndOfMedium { .. } | Self::NotRead => {
                ErrorKind::Usage
            }
        }
    }
}
