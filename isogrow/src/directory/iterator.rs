//! Directory iteration
//!
//! Walks the directory records packed into one directory sector.

use crate::directory::record::File;
use crate::error::{Error, Result};
use crate::types::{Endian, SECTOR_SIZE};
use crate::utils::bytes::ByteView;

/// Iterator over `(offset, record)` pairs of one directory sector
///
/// Stops at the first zero-length record or at the end of the sector. A
/// record that would run past the sector is an error; contents spanning
/// several sectors are not supported.
pub struct RecordIterator<'a> {
    sector: &'a [u8; SECTOR_SIZE],
    location: u32,
    host: Endian,
    offset: usize,
    done: bool,
}

impl<'a> RecordIterator<'a> {
    /// Create new iterator over the sector loaded from `location`
    pub fn new(sector: &'a [u8; SECTOR_SIZE], location: u32, host: Endian) -> Self {
        Self {
            sector,
            location,
            host,
            offset: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for RecordIterator<'a> {
    type Item = Result<(usize, File)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= SECTOR_SIZE {
            return None;
        }

        let record_length = self.sector[self.offset] as usize;
        if record_length == 0 {
            self.done = true;
            return None;
        }
        if self.offset + record_length > SECTOR_SIZE {
            self.done = true;
            return Some(Err(Error::RecordOverrun {
                location: self.location,
                offset: self.offset,
            }));
        }

        let view = ByteView::new(&self.sector[self.offset..self.offset + record_length]);
        let offset = self.offset;
        match File::parse(view, self.host) {
            Ok(file) => {
                self.offset += record_length;
                Some(Ok((offset, file)))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
