//! Low-level decoding helpers shared by every structure

pub mod bytes;
pub mod datetime;
pub mod sector;
pub mod string;
