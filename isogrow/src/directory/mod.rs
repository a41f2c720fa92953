//! Directory records and path tables

pub mod iterator;
pub mod path_table;
pub mod record;

pub use iterator::RecordIterator;
pub use path_table::{Directory, PathTable};
pub use record::{encode_size_field, File, FileFlags};
