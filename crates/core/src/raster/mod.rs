//! Raster data structures and operations

mod element;
mod grid;
mod stack;

pub use element::RasterElement;
pub use grid::{Band, SampleStats};
pub use stack::{BandSummary, DType, InMemoryRaster, RasterSource};
