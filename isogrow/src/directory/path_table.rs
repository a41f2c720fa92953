//! Path table parsing
//!
//! ECMA-119 calls each entry a path table record; it is effectively a
//! directory. The table is a flat list where every entry names its parent
//! by 1-based index, so the hierarchy is known without walking directory
//! contents.

use crate::directory::record::File;
use crate::error::Result;
use crate::types::Endian;
use crate::utils::bytes::ByteView;
use crate::utils::string;
use alloc::string::String;
use alloc::vec::Vec;

/// One path table record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// On-disk record size: 8 + name length + padding
    pub size: usize,

    /// Extended attribute record length
    pub extended_attribute_length: u8,

    /// Logical block of the directory contents
    pub location: u32,

    /// 1-based index of the parent; the root is its own parent
    pub parent: u16,

    /// Display name; UTF-8 once a Joliet tree has been converted
    pub name: String,

    /// Directory identifier exactly as recorded
    pub identifier: Vec<u8>,

    /// Non-directory entries, filled in when the contents are loaded
    pub files: Vec<File>,
}

impl Directory {
    /// Fixed part of a path table record
    pub const HEADER_SIZE: usize = 8;

    /// Parse a path table record starting at the first byte of `view`
    pub fn parse(view: ByteView<'_>, endian: Endian) -> Result<Self> {
        let name_length = view.byte(0)? as usize;
        let identifier = view.slice(Self::HEADER_SIZE, name_length)?.to_vec();

        Ok(Self {
            size: Self::HEADER_SIZE + name_length + name_length % 2,
            extended_attribute_length: view.byte(1)?,
            location: view.u32(2, endian)?,
            parent: view.u16(6, endian)?,
            name: String::from_utf8_lossy(&identifier).into_owned(),
            identifier,
            files: Vec::new(),
        })
    }

    /// Whether this is the root entry (always the first record)
    pub fn is_root(&self) -> bool {
        self.identifier.as_slice() == [0x00]
    }
}

/// Decoded path table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTable {
    /// Directories in on-disk order
    pub directories: Vec<Directory>,
    joliet: bool,
}

impl PathTable {
    /// Parse every record in `data`, which holds exactly the table
    ///
    /// `endian` is the byte order of the table copy that was read: the
    /// type L table is little-endian, the type M table big-endian.
    pub fn parse(data: &[u8], endian: Endian) -> Result<Self> {
        let view = ByteView::new(data);
        let mut directories = Vec::new();
        let mut position = 0;
        while position < view.len() {
            let directory = Directory::parse(view.tail(position)?, endian)?;
            position += directory.size;
            directories.push(directory);
        }
        Ok(Self {
            directories,
            joliet: false,
        })
    }

    /// Convert every directory and file name from UCS-2 to UTF-8
    ///
    /// Runs once; later calls do nothing and return `false`, since the
    /// conversion is not idempotent.
    pub fn joliet(&mut self) -> bool {
        if self.joliet {
            return false;
        }
        for directory in &mut self.directories {
            directory.name = string::from_ucs2(&directory.identifier);
            for file in directory.files.iter_mut().filter(|f| !f.is_dir()) {
                file.name = string::from_ucs2(&file.identifier);
            }
        }
        self.joliet = true;
        true
    }

    /// Whether Joliet names have been applied
    pub fn is_joliet(&self) -> bool {
        self.joliet
    }

    /// Directory by 1-based path table index
    pub fn get(&self, index: u16) -> Option<&Directory> {
        usize::from(index).checked_sub(1).and_then(|i| self.directories.get(i))
    }

    /// Every file in every directory, with its directory
    pub fn files(&self) -> impl Iterator<Item = (&Directory, &File)> {
        self.directories
            .iter()
            .flat_map(|directory| directory.files.iter().map(move |file| (directory, file)))
    }
}
