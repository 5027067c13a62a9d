//! Multi-band raster sources
//!
//! The pipeline consumes decoded rasters through the [`RasterSource`]
//! trait: a declared band count and shape, a declared sample type per
//! band, and a per-band read. Band indices are 1-based throughout,
//! matching GeoTIFF convention.

use crate::error::{Error, Result};
use crate::raster::Band;
use serde::Serialize;
use std::fmt;

/// Declared sample type of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::U8 => "u8",
            DType::U16 => "u16",
            DType::U32 => "u32",
            DType::I8 => "i8",
            DType::I16 => "i16",
            DType::I32 => "i32",
            DType::F32 => "f32",
            DType::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Per-band summary statistics, recomputed per request
#[derive(Debug, Clone, Serialize)]
pub struct BandSummary {
    /// 1-based band index
    pub index: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub dtype: DType,
}

/// A decoded multi-band raster.
///
/// All bands share one spatial shape. `read_band` may fail for an
/// individual band (corrupt page, cast failure) without invalidating
/// the raster as a whole; callers decide how to recover.
pub trait RasterSource {
    /// Number of bands
    fn band_count(&self) -> usize;

    /// Spatial shape as (rows, cols), shared by every band
    fn shape(&self) -> (usize, usize);

    /// Declared sample type of a band (1-based)
    fn dtype(&self, band: usize) -> DType;

    /// Read one band (1-based) as a grid of f64 samples
    fn read_band(&self, band: usize) -> Result<Band<f64>>;

    /// Summarize one band (1-based): min/max/mean over valid cells
    fn summarize_band(&self, band: usize) -> Result<BandSummary> {
        let stats = self.read_band(band)?.statistics();
        Ok(BandSummary {
            index: band,
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            dtype: self.dtype(band),
        })
    }
}

/// A raster whose bands are already decoded in memory.
///
/// This is the hand-off type for collaborators that decode rasters
/// themselves, and the test double for the pipeline.
#[derive(Debug, Clone)]
pub struct InMemoryRaster {
    bands: Vec<Band<f64>>,
    dtypes: Vec<DType>,
    shape: (usize, usize),
}

impl InMemoryRaster {
    /// Build from decoded bands. All bands must share one shape.
    pub fn new(bands: Vec<Band<f64>>) -> Result<Self> {
        let first = bands.first().ok_or_else(|| {
            Error::InputFormat("raster has no bands".to_string())
        })?;
        let shape = first.shape();

        for band in &bands {
            if band.shape() != shape {
                return Err(Error::SizeMismatch {
                    er: shape.0,
                    ec: shape.1,
                    ar: band.rows(),
                    ac: band.cols(),
                });
            }
        }

        let dtypes = vec![DType::F64; bands.len()];
        Ok(Self {
            bands,
            dtypes,
            shape,
        })
    }

    /// Override the declared sample type of a band (1-based)
    pub fn set_dtype(&mut self, band: usize, dtype: DType) -> Result<()> {
        if band == 0 || band > self.dtypes.len() {
            return Err(Error::BandOutOfRange {
                band,
                count: self.dtypes.len(),
            });
        }
        self.dtypes[band - 1] = dtype;
        Ok(())
    }
}

impl RasterSource for InMemoryRaster {
    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn shape(&self) -> (usize, usize) {
        self.shape
    }

    fn dtype(&self, band: usize) -> DType {
        self.dtypes
            .get(band.wrapping_sub(1))
            .copied()
            .unwrap_or(DType::F64)
    }

    fn read_band(&self, band: usize) -> Result<Band<f64>> {
        self.bands
            .get(band.wrapping_sub(1))
            .cloned()
            .ok_or(Error::BandOutOfRange {
                band,
                count: self.bands.len(),
            })
    }
}
