//! I/O operations for reading geospatial data

mod native;

pub use native::TiffStack;
