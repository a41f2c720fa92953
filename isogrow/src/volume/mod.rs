//! Volume descriptor parsing
//!
//! Volume descriptors start at sector 16 and describe the filesystem layout.
//! Only the Primary and a Joliet Supplementary descriptor are decoded in
//! full; other types are recognised by their header and skipped.

pub mod descriptor;
pub mod header;

pub use descriptor::{joliet_level_of, VolumeDescriptor};
pub use header::VolumeDescriptorHeader;
