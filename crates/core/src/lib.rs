//! # CropSight Core
//!
//! Core types and I/O for the CropSight vegetation-health pipeline.
//!
//! This crate provides:
//! - `Band<T>`: single-band 2-D sample grid
//! - `RasterSource`: multi-band raster abstraction with per-band reads
//! - `InMemoryRaster` / `TiffStack`: in-memory and GeoTIFF-backed sources
//! - NaN-aware band statistics
//! - The error taxonomy shared by the pipeline crates

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{Band, BandSummary, DType, InMemoryRaster, RasterSource};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{
        Band, BandSummary, DType, InMemoryRaster, RasterElement, RasterSource,
    };
}
