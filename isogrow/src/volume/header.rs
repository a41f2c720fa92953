//! Volume descriptor header
//!
//! The first 7 bytes of every descriptor in the set.

use crate::error::{Error, Result};
use crate::types::{Identifier, SectorType};
use crate::utils::bytes::ByteView;

/// Volume descriptor header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDescriptorHeader {
    /// Descriptor type (BP 1)
    pub sector_type: SectorType,

    /// Standard identifier (BP 2-6)
    pub identifier: [u8; 5],

    /// Descriptor version (BP 7)
    pub version: u8,
}

impl VolumeDescriptorHeader {
    /// Header size in bytes
    pub const SIZE: usize = 7;

    /// Decode the header at the start of a descriptor sector
    pub fn parse(view: ByteView<'_>) -> Result<Self> {
        let mut identifier = [0u8; 5];
        identifier.copy_from_slice(view.slice(1, 5)?);
        Ok(Self {
            sector_type: SectorType::from_code(view.byte(0)?),
            identifier,
            version: view.byte(6)?,
        })
    }

    /// Standard the descriptor claims to follow
    pub fn standard(&self) -> Identifier {
        Identifier::of(&self.identifier)
    }

    /// Fail unless this is an ECMA-119 descriptor
    pub fn require_ecma119(&self) -> Result<()> {
        match self.standard() {
            Identifier::Ecma119 => Ok(()),
            _ => Err(Error::UnsupportedIdentifier(self.identifier)),
        }
    }
}
