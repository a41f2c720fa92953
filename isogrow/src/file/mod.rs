//! File data access
//!
//! Reading file contents and the stream handle used by in-place transforms.

pub mod cursor;
pub mod extent;

pub use cursor::FileCursor;
pub use extent::Extent;

use crate::directory::record::File;
use crate::error::{Error, Result};
use crate::medium::Medium;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Read file contents into a new Vec
///
/// Fails with [`Error::SizeMismatch`] when the medium ends before the
/// declared size does.
pub fn read_file<B: BlockIo>(medium: &mut Medium<B>, file: &File) -> Result<Vec<u8>> {
    let extent = file.extent();
    if extent.data_end() > medium.len() {
        return Err(Error::SizeMismatch {
            expected: file.size,
            actual: medium.len().saturating_sub(extent.data_offset()),
        });
    }
    let mut buffer = alloc::vec![0u8; file.size as usize];
    medium.read_at(extent.data_offset(), &mut buffer)?;
    Ok(buffer)
}
