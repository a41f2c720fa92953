//! ECMA-119 (ISO 9660) image reader with in-place file resize
//!
//! A `no_std` reader for ISO 9660 images with Joliet names, and a bounded
//! editor that lets a file grow into the padding of its last sector.
//!
//! # Overview
//!
//! - Volume descriptor parsing (Primary, Joliet Supplementary)
//! - Path tables and single-sector directory contents
//! - Flat file lookup by name, preferring Joliet names
//! - In-place rewrite of a file's data, patching every directory record
//!   that points at it
//!
//! # Architecture
//!
//! 1. **Medium** - byte access to the image over any `gpt_disk_io::BlockIo`
//! 2. **Volume layer** - descriptors from sector 16 up to the set terminator
//! 3. **Directory layer** - path tables and directory records
//! 4. **File layer** - extents and the cursor handed to transforms
//! 5. **Image** - ties the layers together and owns the resize protocol
//!
//! # Usage
//!
//! ```ignore
//! use isogrow::Image;
//!
//! let mut image = Image::new(block_io)?;
//! image.read()?;
//!
//! if let Some(file) = image.find("grub.cfg")? {
//!     image.modify_file(&file, |cursor, file| {
//!         let original = cursor.read_content()?;
//!         let patched = patch(&original);
//!         let growth = (patched.len() - original.len()) as u32;
//!         cursor.check_growth(growth)?;
//!         cursor.rewind();
//!         cursor.write_all(&patched)?;
//!         Ok(growth)
//!     })?;
//! }
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod directory;
pub mod error;
pub mod file;
pub mod image;
pub mod medium;
pub mod types;
pub mod utils;
pub mod volume;

pub use directory::{encode_size_field, Directory, File, FileFlags, PathTable};
pub use error::{Error, ErrorKind, Result};
pub use file::{read_file, Extent, FileCursor};
pub use image::{Image, ImageOptions, ImageState, Occurrence};
pub use medium::Medium;
pub use types::{identifier_of, Endian, Identifier, SectorType, SECTOR_SIZE, SYSTEM_AREA_SIZE};
pub use volume::{VolumeDescriptor, VolumeDescriptorHeader};
