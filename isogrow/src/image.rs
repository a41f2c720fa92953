//! Image reading and in-place resize
//!
//! [`Image::read`] scans the volume descriptor set, loads the path tables
//! and the contents of every directory, and records where each directory
//! record sits on the medium. [`Image::modify_file`] then lets a transform
//! rewrite a file within its sector slack and patches every record that
//! points at the file's data.

use crate::directory::iterator::RecordIterator;
use crate::directory::path_table::PathTable;
use crate::directory::record::{encode_size_field, File};
use crate::error::{Error, Result};
use crate::file::{self, FileCursor};
use crate::medium::Medium;
use crate::types::{Endian, SectorType, SECTOR_SIZE, VOLUME_DESCRIPTOR_START};
use crate::utils::bytes::ByteView;
use crate::utils::sector;
use crate::volume::{VolumeDescriptor, VolumeDescriptorHeader};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Progress of [`Image::read`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    /// Nothing has been read, or the last read failed
    Unopened,
    /// Reading volume descriptors
    ScanningDescriptors,
    /// Descriptor set read up to its terminator
    DescriptorsLoaded,
    /// Path tables decoded
    PathTablesLoaded,
    /// Directory contents loaded; lookups and resizes are allowed
    Ready,
}

/// Options controlling how an image is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    /// Which copy of dual-endian fields to trust
    pub host_endian: Endian,
    /// Logical sector of the device where the image starts
    pub start_sector: u64,
    /// Maximum number of volume descriptors to scan
    pub max_descriptors: usize,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            host_endian: Endian::NATIVE,
            start_sector: 0,
            max_descriptors: 100,
        }
    }
}

impl ImageOptions {
    /// Set the trusted byte order
    pub fn host_endian(mut self, endian: Endian) -> Self {
        self.host_endian = endian;
        self
    }

    /// Set the sector offset of the image on the device
    pub fn start_sector(mut self, sector: u64) -> Self {
        self.start_sector = sector;
        self
    }

    /// Set the descriptor scan limit
    pub fn max_descriptors(mut self, count: usize) -> Self {
        self.max_descriptors = count;
        self
    }
}

/// Canonical state of one data location
///
/// A file reachable from both the primary and the Joliet tree has one
/// directory record in each; both are patched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Current size of the data at this location
    pub size: u32,
    /// Byte offsets of every directory record pointing here
    pub offsets: Vec<u64>,
}

/// ECMA-119 image on a block device
pub struct Image<B: BlockIo> {
    medium: Medium<B>,
    options: ImageOptions,
    state: ImageState,
    primary: Option<VolumeDescriptor>,
    supplementary: Option<VolumeDescriptor>,
    file_positions: BTreeMap<u32, Occurrence>,
}

impl<B: BlockIo> Image<B> {
    /// Wrap a device holding an image at sector 0
    pub fn new(io: B) -> Result<Self> {
        Self::with_options(io, ImageOptions::default())
    }

    /// Wrap a device with explicit options
    ///
    /// Fails if the device block size does not divide 2048.
    pub fn with_options(io: B, options: ImageOptions) -> Result<Self> {
        Ok(Self {
            medium: Medium::new(io, options.start_sector)?,
            options,
            state: ImageState::Unopened,
            primary: None,
            supplementary: None,
            file_positions: BTreeMap::new(),
        })
    }

    /// Read descriptors, path tables and directory contents
    ///
    /// On failure the image returns to [`ImageState::Unopened`] with
    /// nothing retained.
    pub fn read(&mut self) -> Result<()> {
        self.reset();
        match self.load() {
            Ok(()) => {
                self.state = ImageState::Ready;
                Ok(())
            }
            Err(err) => {
                log::error!("failed to read image: {err}");
                self.reset();
                Err(err)
            }
        }
    }

    fn reset(&mut self) {
        self.state = ImageState::Unopened;
        self.primary = None;
        self.supplementary = None;
        self.file_positions.clear();
    }

    fn load(&mut self) -> Result<()> {
        self.scan_descriptors()?;
        self.state = ImageState::DescriptorsLoaded;

        let host = self.options.host_endian;
        for volume in [self.primary.as_mut(), self.supplementary.as_mut()].into_iter().flatten() {
            load_path_table(&mut self.medium, volume, host)?;
        }
        self.state = ImageState::PathTablesLoaded;

        for volume in [self.primary.as_mut(), self.supplementary.as_mut()].into_iter().flatten() {
            load_directories(&mut self.medium, volume, host, &mut self.file_positions)?;
        }
        Ok(())
    }

    fn scan_descriptors(&mut self) -> Result<()> {
        self.state = ImageState::ScanningDescriptors;
        let host = self.options.host_endian;
        let mut buffer = [0u8; SECTOR_SIZE];

        let mut terminated = false;
        for index in 0..self.options.max_descriptors {
            let sector = VOLUME_DESCRIPTOR_START + index as u64;
            self.medium.read_sector(sector, &mut buffer)?;
            let view = ByteView::new(&buffer);
            let header = VolumeDescriptorHeader::parse(view)?;
            header.require_ecma119()?;

            match header.sector_type {
                SectorType::SetTerminator => {
                    terminated = true;
                    break;
                }
                SectorType::BootRecord => {
                    log::debug!("sector {sector}: boot record ignored");
                }
                SectorType::Primary => {
                    let volume = VolumeDescriptor::parse(view, header, host)?;
                    log::debug!("sector {sector}: primary volume {:?}", volume.volume_id());
                    self.primary = Some(volume);
                }
                SectorType::Supplementary => {
                    let volume = VolumeDescriptor::parse(view, header, host)?;
                    let level = volume.joliet_level();
                    if level > 0 {
                        log::debug!("sector {sector}: Joliet level {level} volume");
                        self.supplementary = Some(volume);
                    } else {
                        log::warn!(
                            "sector {sector}: skipping non-Joliet supplementary volume descriptor"
                        );
                    }
                }
                SectorType::Partition | SectorType::Unknown(_) => {
                    log::warn!(
                        "sector {sector}: unknown descriptor type {}",
                        header.sector_type.code()
                    );
                }
            }
        }

        if !terminated {
            return Err(Error::MissingTerminator {
                scanned: self.options.max_descriptors,
            });
        }
        if self.primary.is_none() && self.supplementary.is_none() {
            return Err(Error::MissingVolumeDescriptor);
        }
        Ok(())
    }

    /// Current state
    pub fn state(&self) -> ImageState {
        self.state
    }

    /// Options this image was opened with
    pub fn options(&self) -> &ImageOptions {
        &self.options
    }

    /// Primary volume descriptor, if present
    pub fn primary(&self) -> Option<&VolumeDescriptor> {
        self.primary.as_ref()
    }

    /// Joliet supplementary volume descriptor, if present
    pub fn supplementary(&self) -> Option<&VolumeDescriptor> {
        self.supplementary.as_ref()
    }

    /// Volume that lookups use: Joliet when present, otherwise primary
    pub fn active_volume(&self) -> Option<&VolumeDescriptor> {
        self.supplementary.as_ref().or(self.primary.as_ref())
    }

    /// Recorded state of the data at `location`
    pub fn occurrences(&self, location: u32) -> Option<&Occurrence> {
        self.file_positions.get(&location)
    }

    /// Find the first file named exactly `name`
    ///
    /// Prefers the Joliet tree, converting its names on first use. Names
    /// are compared as recorded, including any `;1` version suffix on the
    /// primary tree. Absence is `Ok(None)`.
    pub fn find(&mut self, name: &str) -> Result<Option<File>> {
        self.require_ready()?;
        let volume = match (self.supplementary.as_mut(), self.primary.as_mut()) {
            (Some(volume), _) | (None, Some(volume)) => volume,
            (None, None) => return Err(Error::MissingVolumeDescriptor),
        };
        if !volume.has_file_lookup() {
            if volume.is_supplementary() {
                if let Some(table) = volume.path_table.as_mut() {
                    table.joliet();
                }
            }
            volume.build_file_lookup();
        }
        Ok(volume.lookup(name).cloned())
    }

    /// Rewrite a file in place through `transform`
    ///
    /// The transform gets a cursor at the file's first data byte and the
    /// file with its current size, and returns how many bytes the file grew
    /// by. Every directory record for the file's location is then patched
    /// with the new size. The cursor can reach the whole medium; staying
    /// within [`File::max_growth`] is the transform's job, and a larger
    /// reported growth is rejected before any record is patched. Content
    /// already written by the transform is not rolled back.
    ///
    /// `file` may be stale: the size recorded for its location is used, so
    /// repeated resizes need no fresh [`Image::find`].
    pub fn modify_file<F>(&mut self, file: &File, transform: F) -> Result<u32>
    where
        F: FnOnce(&mut FileCursor<'_, B>, &File) -> Result<u32>,
    {
        self.require_ready()?;
        let location = file.location;
        let size = self
            .file_positions
            .get(&location)
            .map(|occurrence| occurrence.size)
            .ok_or(Error::UnknownLocation { location })?;
        if size != file.size {
            log::debug!("{}: stale size {} replaced by {size}", file.name, file.size);
        }
        let current = File { size, ..file.clone() };

        let growth = {
            let mut cursor = FileCursor::new(&mut self.medium, current.clone());
            transform(&mut cursor, &current)?
        };
        if growth == 0 {
            return Ok(0);
        }
        let max = current.max_growth();
        if growth > max {
            log::warn!("{}: transform grew the file by {growth}, slack is {max}", current.name);
            return Err(Error::GrowthExceedsSlack { growth, max });
        }

        let new_size = size + growth;
        let field = encode_size_field(new_size);
        let occurrence = self
            .file_positions
            .get_mut(&location)
            .ok_or(Error::UnknownLocation { location })?;
        for &offset in &occurrence.offsets {
            self.medium.write_at(offset + File::SIZE_OFFSET as u64, &field)?;
        }
        self.medium.flush()?;
        occurrence.size = new_size;
        log::debug!(
            "{}: resized {size} -> {new_size}, {} records patched",
            current.name,
            occurrence.offsets.len()
        );

        for volume in [self.primary.as_mut(), self.supplementary.as_mut()].into_iter().flatten() {
            volume.update_file_size(location, new_size);
        }
        Ok(growth)
    }

    /// Read a file's contents at its current size
    pub fn read_file(&mut self, file: &File) -> Result<Vec<u8>> {
        self.require_ready()?;
        let size = self
            .file_positions
            .get(&file.location)
            .map_or(file.size, |occurrence| occurrence.size);
        file::read_file(&mut self.medium, &File { size, ..file.clone() })
    }

    /// Borrow the medium
    pub fn medium(&self) -> &Medium<B> {
        &self.medium
    }

    /// Give the block device back
    pub fn into_inner(self) -> B {
        self.medium.into_inner()
    }

    fn require_ready(&self) -> Result<()> {
        match self.state {
            ImageState::Ready => Ok(()),
            _ => Err(Error::NotRead),
        }
    }
}

/// Load the path table of `volume`, which must fit in one sector
fn load_path_table<B: BlockIo>(
    medium: &mut Medium<B>,
    volume: &mut VolumeDescriptor,
    host: Endian,
) -> Result<()> {
    let size = volume.path_table_size;
    if size as usize > SECTOR_SIZE {
        return Err(Error::PathTableTooLarge { size });
    }
    let mut buffer = [0u8; SECTOR_SIZE];
    medium.read_sector(u64::from(volume.path_table_location), &mut buffer)?;
    let table = PathTable::parse(&buffer[..size as usize], host)?;
    log::debug!(
        "path table at sector {}: {} directories",
        volume.path_table_location,
        table.directories.len()
    );
    volume.path_table = Some(table);
    Ok(())
}

/// Load the contents of every directory in the path table of `volume`
fn load_directories<B: BlockIo>(
    medium: &mut Medium<B>,
    volume: &mut VolumeDescriptor,
    host: Endian,
    positions: &mut BTreeMap<u32, Occurrence>,
) -> Result<()> {
    let Some(table) = volume.path_table.as_mut() else {
        return Ok(());
    };
    for directory in &mut table.directories {
        directory.files = read_directory(medium, directory.location, host, positions)?;
    }
    Ok(())
}

/// Decode one directory sector, recording where every record sits
///
/// Subdirectory records are recorded but not returned; the path table
/// already describes the hierarchy.
fn read_directory<B: BlockIo>(
    medium: &mut Medium<B>,
    location: u32,
    host: Endian,
    positions: &mut BTreeMap<u32, Occurrence>,
) -> Result<Vec<File>> {
    let mut buffer = [0u8; SECTOR_SIZE];
    medium.read_sector(u64::from(location), &mut buffer)?;
    let base = sector::sector_to_byte(location);

    let mut files = Vec::new();
    for record in RecordIterator::new(&buffer, location, host) {
        let (offset, file) = record?;
        if offset == 0 && file.is_self_or_parent() && file.spans_sectors() {
            return Err(Error::DirectoryTooLarge {
                location,
                size: file.size,
            });
        }
        #[cfg(feature = "trace")]
        log::trace!(
            "sector {location} +{offset}: {:?} at {} ({} bytes)",
            file.name,
            file.location,
            file.size
        );

        positions
            .entry(file.location)
            .or_insert_with(|| Occurrence {
                size: file.size,
                offsets: Vec::new(),
            })
            .offsets
            .push(base + offset as u64);
        if !file.is_dir() {
            files.push(file);
        }
    }
    Ok(files)
}
