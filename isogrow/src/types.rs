//! Common types and constants for ECMA-119 images

/// Logical sector size (always 2048 bytes)
pub const SECTOR_SIZE: usize = 2048;

/// Number of sectors in the reserved system area
pub const NUM_SYSTEM_SECTORS: u64 = 16;

/// Size of the system area in bytes
pub const SYSTEM_AREA_SIZE: u64 = NUM_SYSTEM_SECTORS * SECTOR_SIZE as u64;

/// Volume descriptor set starts right after the system area
pub const VOLUME_DESCRIPTOR_START: u64 = NUM_SYSTEM_SECTORS;

/// Size of the root directory record embedded in a volume descriptor
pub const DIRECTORY_RECORD_SIZE: usize = 34;

/// Size of the 17-byte ASCII datetime
pub const LONG_DATETIME_SIZE: usize = 17;

/// Size of the 7-byte binary datetime
pub const SHORT_DATETIME_SIZE: usize = 7;

/// Size of the volume set, publisher, preparer and application identifiers
pub const IDENTIFIER_SIZE: usize = 128;

/// Size of the copyright, abstract and bibliographic file identifiers
pub const FILE_IDENTIFIER_SIZE: usize = 37;

/// Size of the application use area of a volume descriptor
pub const APPLICATION_USE_SIZE: usize = 512;

/// Byte order used to pick one copy of a dual-endian field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Most significant byte first
    Big,
    /// Least significant byte first
    Little,
}

impl Endian {
    /// Byte order of the compilation target
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endian = Endian::Big;

    /// Byte order of the compilation target
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endian = Endian::Little;
}

impl Default for Endian {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorType {
    /// Boot Record (El Torito)
    BootRecord,
    /// Primary Volume Descriptor
    Primary,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary,
    /// Volume Partition Descriptor
    Partition,
    /// Volume Descriptor Set Terminator
    SetTerminator,
    /// Any other type code
    Unknown(u8),
}

impl SectorType {
    /// Decode the type byte of a volume descriptor
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::BootRecord,
            1 => Self::Primary,
            2 => Self::Supplementary,
            3 => Self::Partition,
            255 => Self::SetTerminator,
            other => Self::Unknown(other),
        }
    }

    /// Raw type byte
    pub const fn code(self) -> u8 {
        match self {
            Self::BootRecord => 0,
            Self::Primary => 1,
            Self::Supplementary => 2,
            Self::Partition => 3,
            Self::SetTerminator => 255,
            Self::Unknown(code) => code,
        }
    }
}

/// Standard a volume descriptor claims to follow
///
/// ECMA-167 uses a different identifier for nearly every descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier {
    /// `CD001`
    Ecma119,
    /// `CDW02`
    Ecma168,
    /// `NSR02`, ECMA-167 edition 2
    Ecma167Previous,
    /// `NSR03`
    Ecma167,
    /// `BEA01`, beginning extended area descriptor
    Ecma167Extended,
    /// `BOOT2`, boot descriptor
    Ecma167Boot,
    /// `TEA01`, terminating extended area descriptor
    Ecma167Terminator,
    /// Anything else
    Unknown,
}

impl Identifier {
    /// Classify a raw 5-byte standard identifier
    pub fn of(raw: &[u8]) -> Self {
        match raw {
            b"CD001" => Self::Ecma119,
            b"CDW02" => Self::Ecma168,
            b"NSR02" => Self::Ecma167Previous,
            b"NSR03" => Self::Ecma167,
            b"BEA01" => Self::Ecma167Extended,
            b"BOOT2" => Self::Ecma167Boot,
            b"TEA01" => Self::Ecma167Terminator,
            _ => Self::Unknown,
        }
    }
}

/// Classify a standard identifier string
pub fn identifier_of(identifier: &str) -> Identifier {
    Identifier::of(identifier.as_bytes())
}
