//! Sector alignment and calculation utilities

use crate::types::SECTOR_SIZE;

/// Align value to sector boundary (round up)
pub const fn align_to_sector(value: u64) -> u64 {
    (value + SECTOR_SIZE as u64 - 1) & !(SECTOR_SIZE as u64 - 1)
}

/// Convert sector number to byte offset
pub const fn sector_to_byte(sector: u32) -> u64 {
    sector as u64 * SECTOR_SIZE as u64
}
