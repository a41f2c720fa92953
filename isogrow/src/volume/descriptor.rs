//! Primary and Supplementary Volume Descriptors
//!
//! Both share one layout (ECMA-119 8.4 and 8.5). The supplementary form
//! adds volume flags and escape sequences; Joliet is recognised from the
//! escape sequences alone.

use crate::directory::path_table::PathTable;
use crate::directory::record::File;
use crate::error::Result;
use crate::types::{
    Endian, SectorType, APPLICATION_USE_SIZE, DIRECTORY_RECORD_SIZE, FILE_IDENTIFIER_SIZE,
    IDENTIFIER_SIZE,
};
use crate::utils::bytes::ByteView;
use crate::utils::{datetime, string};
use crate::volume::header::VolumeDescriptorHeader;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// Position of a file inside a path table: (directory index, file index)
type FileSlot = (usize, usize);

/// Decoded Primary or Supplementary Volume Descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeDescriptor {
    /// Descriptor header
    pub header: VolumeDescriptorHeader,

    /// Volume flags (BP 8, supplementary only)
    pub flags: u8,

    /// System identifier (BP 9-40)
    pub system_identifier: String,

    /// Volume identifier (BP 41-72)
    pub volume_identifier: String,

    /// Volume space size in logical blocks (BP 81-88)
    pub volume_space_size: u32,

    /// Escape sequences (BP 89-120, supplementary only)
    pub escape_sequences: [u8; 32],

    /// Volume sequence number (BP 125-128)
    pub volume_sequence_number: u16,

    /// Logical block size (BP 129-132)
    pub logical_block_size: u16,

    /// Path table size in bytes (BP 133-140)
    pub path_table_size: u32,

    /// Location of the path table in the host byte order
    pub path_table_location: u32,

    /// Location of the optional path table in the host byte order
    pub optional_path_table_location: u32,

    /// Root directory record (BP 157-190)
    pub root_directory: File,

    /// Volume set identifier (BP 191-318)
    pub volume_set_identifier: String,

    /// Publisher identifier (BP 319-446)
    pub publisher_identifier: String,

    /// Data preparer identifier (BP 447-574)
    pub data_preparer_identifier: String,

    /// Application identifier (BP 575-702)
    pub application_identifier: String,

    /// Copyright file identifier (BP 703-739)
    pub copyright_file_identifier: String,

    /// Abstract file identifier (BP 740-776)
    pub abstract_file_identifier: String,

    /// Bibliographic file identifier (BP 777-813)
    pub bibliographic_file_identifier: String,

    /// Volume creation time, milliseconds since the epoch
    pub creation_time: i64,

    /// Volume modification time, milliseconds since the epoch
    pub modification_time: i64,

    /// Volume expiration time, milliseconds since the epoch
    pub expiration_time: i64,

    /// Volume effective time, milliseconds since the epoch
    pub effective_time: i64,

    /// File structure version (BP 882)
    pub file_structure_version: u8,

    /// Application use area (BP 884-1395)
    pub application_use: Vec<u8>,

    /// Path table, once loaded
    pub path_table: Option<PathTable>,

    filenames: Option<BTreeMap<String, Vec<FileSlot>>>,
}

impl VolumeDescriptor {
    /// Decode a descriptor sector whose header was already parsed
    ///
    /// `host` picks which copy of each dual-endian field is trusted and
    /// which of the type L (little-endian) and type M (big-endian) path
    /// tables is used.
    pub fn parse(view: ByteView<'_>, header: VolumeDescriptorHeader, host: Endian) -> Result<Self> {
        header.require_ecma119()?;
        let supplementary = header.sector_type == SectorType::Supplementary;

        let mut escape_sequences = [0u8; 32];
        let mut flags = 0;
        if supplementary {
            flags = view.byte(7)?;
            escape_sequences.copy_from_slice(view.slice(88, 32)?);
        }
        let ucs2 = supplementary && joliet_level_of(&escape_sequences) > 0;
        let text = |at: usize, len: usize| -> Result<String> {
            if ucs2 {
                Ok(string::from_ucs2(view.slice(at, len)?))
            } else {
                view.text(at, len)
            }
        };

        let (path_table_location, optional_path_table_location) = match host {
            Endian::Little => (view.u32(140, Endian::Little)?, view.u32(144, Endian::Little)?),
            Endian::Big => (view.u32(148, Endian::Big)?, view.u32(152, Endian::Big)?),
        };

        Ok(Self {
            header,
            flags,
            system_identifier: text(8, 32)?,
            volume_identifier: text(40, 32)?,
            volume_space_size: view.both_endian_u32(80, host)?,
            escape_sequences,
            volume_sequence_number: view.both_endian_u16(124, host)?,
            logical_block_size: view.both_endian_u16(128, host)?,
            path_table_size: view.both_endian_u32(132, host)?,
            path_table_location,
            optional_path_table_location,
            root_directory: File::parse(view.window(156, DIRECTORY_RECORD_SIZE)?, host)?,
            volume_set_identifier: text(190, IDENTIFIER_SIZE)?,
            publisher_identifier: text(318, IDENTIFIER_SIZE)?,
            data_preparer_identifier: text(446, IDENTIFIER_SIZE)?,
            application_identifier: text(574, IDENTIFIER_SIZE)?,
            copyright_file_identifier: text(702, FILE_IDENTIFIER_SIZE)?,
            abstract_file_identifier: text(739, FILE_IDENTIFIER_SIZE)?,
            bibliographic_file_identifier: text(776, FILE_IDENTIFIER_SIZE)?,
            creation_time: datetime::long_datetime(view, 813)?,
            modification_time: datetime::long_datetime(view, 830)?,
            expiration_time: datetime::long_datetime(view, 847)?,
            effective_time: datetime::long_datetime(view, 864)?,
            file_structure_version: view.byte(881)?,
            application_use: view.slice(883, APPLICATION_USE_SIZE)?.to_vec(),
            path_table: None,
            filenames: None,
        })
    }

    /// Is this a Supplementary Volume Descriptor?
    pub fn is_supplementary(&self) -> bool {
        self.header.sector_type == SectorType::Supplementary
    }

    /// Joliet level 1 to 3 from the escape sequences, 0 if not Joliet
    pub fn joliet_level(&self) -> u8 {
        joliet_level_of(&self.escape_sequences)
    }

    /// Trimmed system identifier
    pub fn system_id(&self) -> &str {
        string::trim_trailing_spaces(&self.system_identifier)
    }

    /// Trimmed volume identifier
    pub fn volume_id(&self) -> &str {
        string::trim_trailing_spaces(&self.volume_identifier)
    }

    /// Trimmed publisher identifier
    pub fn publisher_id(&self) -> &str {
        string::trim_trailing_spaces(&self.publisher_identifier)
    }

    /// Trimmed application identifier
    pub fn application_id(&self) -> &str {
        string::trim_trailing_spaces(&self.application_identifier)
    }

    /// Loaded path table, if any
    pub fn path_table(&self) -> Option<&PathTable> {
        self.path_table.as_ref()
    }

    /// Whether the filename index has been built
    pub fn has_file_lookup(&self) -> bool {
        self.filenames.is_some()
    }

    /// Index every non-directory file of the path table by name
    ///
    /// Same-named files keep path table order; lookups return the first.
    pub fn build_file_lookup(&mut self) {
        let mut filenames: BTreeMap<String, Vec<FileSlot>> = BTreeMap::new();
        if let Some(table) = &self.path_table {
            for (d, directory) in table.directories.iter().enumerate() {
                for (f, file) in directory.files.iter().enumerate() {
                    if !file.is_dir() {
                        filenames.entry(file.name.clone()).or_default().push((d, f));
                    }
                }
            }
        }
        log::debug!(
            "{}: indexed {} file names",
            self.volume_id(),
            filenames.len()
        );
        self.filenames = Some(filenames);
    }

    /// First file with exactly this name, if the index is built
    pub fn lookup(&self, name: &str) -> Option<&File> {
        let (d, f) = *self.filenames.as_ref()?.get(name)?.first()?;
        self.path_table.as_ref()?.directories.get(d)?.files.get(f)
    }

    /// Every file sharing the data `location`
    pub fn files_at(&self, location: u32) -> impl Iterator<Item = &File> {
        self.path_table
            .iter()
            .flat_map(|table| table.files().map(|(_, file)| file))
            .filter(move |file| file.location == location)
    }

    /// Set the size of every in-memory file whose data lives at `location`
    ///
    /// Returns how many entries changed.
    pub fn update_file_size(&mut self, location: u32, size: u32) -> usize {
        let mut updated = 0;
        if let Some(table) = &mut self.path_table {
            for directory in &mut table.directories {
                for file in directory.files.iter_mut().filter(|f| f.location == location) {
                    file.size = size;
                    updated += 1;
                }
            }
        }
        updated
    }
}

/// Joliet level encoded in supplementary escape sequences
///
/// `%/@`, `%/C` and `%/E` followed by NUL are levels 1, 2 and 3.
pub fn joliet_level_of(escape_sequences: &[u8]) -> u8 {
    match escape_sequences {
        [b'%', b'/', b'@', 0, ..] => 1,
        [b'%', b'/', b'C', 0, ..] => 2,
        [b'%', b'/', b'E', 0, ..] => 3,
        _ => 0,
    }
}
