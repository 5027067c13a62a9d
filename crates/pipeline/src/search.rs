//! Band combination search
//!
//! The band layout of an uploaded raster is not trusted: any band could
//! hold red or near-infrared reflectance. The search computes NDVI for
//! every ordered (red, nir) pair and keeps the pairing with the highest
//! mean index, on the grounds that the true red/nir pairing maximizes
//! the vegetation signal while wrong pairings hover near zero.

use crate::ndvi::ndvi;
use crate::reader::read_band_or_zero;
use cropsight_core::{Band, Error, RasterSource, Result};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::debug;

/// One scored (red, nir) pairing
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NdviCandidate {
    /// 1-based index of the band treated as red
    pub red_band: usize,
    /// 1-based index of the band treated as near-infrared
    pub nir_band: usize,
    pub ndvi_mean: f64,
    pub ndvi_min: f64,
    pub ndvi_max: f64,
}

/// Outcome of a successful search
#[derive(Debug, Clone, Serialize)]
pub struct BandSearch {
    /// Every valid candidate, in enumeration order
    pub candidates: Vec<NdviCandidate>,
    /// The candidate with the maximum NDVI mean; ties go to the
    /// earliest (red, nir) in enumeration order
    pub best: NdviCandidate,
}

/// Enumerate all ordered (red, nir) band pairs and score each by NDVI.
///
/// Bands are read once up front through the fault-tolerant reader, so an
/// unreadable band degrades to zeros instead of aborting the search.
/// Candidates whose mean is not finite are discarded. If no candidate
/// survives, the search fails with [`Error::Inconclusive`] carrying a
/// per-band min/max listing for operator inspection; the pipeline never
/// guesses a default pairing.
pub fn search_band_combinations(
    source: &dyn RasterSource,
    diagnostics: &mut Vec<String>,
) -> Result<BandSearch> {
    let count = source.band_count();

    let bands: Vec<Band<f64>> = (1..=count)
        .map(|band| read_band_or_zero(source, band, diagnostics))
        .collect();

    let mut candidates = Vec::new();
    let mut best: Option<NdviCandidate> = None;

    for red in 1..=count {
        for nir in 1..=count {
            if red == nir {
                continue;
            }

            let index = ndvi(&bands[nir - 1], &bands[red - 1])?;
            let stats = index.statistics();

            let (mean, min, max) = match (stats.mean, stats.min, stats.max) {
                (Some(mean), Some(min), Some(max)) if mean.is_finite() => (mean, min, max),
                _ => {
                    debug!(red, nir, "discarding pair without a finite NDVI mean");
                    continue;
                }
            };

            let candidate = NdviCandidate {
                red_band: red,
                nir_band: nir,
                ndvi_mean: mean,
                ndvi_min: min,
                ndvi_max: max,
            };
            debug!(red, nir, mean, "scored band pair");
            candidates.push(candidate);

            // Strict comparison keeps the earliest pair on ties
            if best.map_or(true, |b| candidate.ndvi_mean > b.ndvi_mean) {
                best = Some(candidate);
            }
        }
    }

    match best {
        Some(best) => Ok(BandSearch { candidates, best }),
        None => Err(Error::Inconclusive {
            diagnostics: band_listing(source, &bands),
        }),
    }
}

/// Human-readable per-band min/max listing for inconclusive searches
fn band_listing(source: &dyn RasterSource, bands: &[Band<f64>]) -> String {
    let mut out = String::new();
    for (i, band) in bands.iter().enumerate() {
        let index = i + 1;
        let stats = band.statistics();
        match (stats.min, stats.max) {
            (Some(min), Some(max)) => {
                let _ = writeln!(
                    out,
                    "  band {} ({}): min={:.4}, max={:.4}",
                    index,
                    source.dtype(index),
                    min,
                    max
                );
            }
            _ => {
                let _ = writeln!(
                    out,
                    "  band {} ({}): no valid samples",
                    index,
                    source.dtype(index)
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropsight_core::InMemoryRaster;

    fn uniform_raster(values: &[f64], rows: usize, cols: usize) -> InMemoryRaster {
        let bands = values
            .iter()
            .map(|&v| Band::filled(rows, cols, v))
            .collect();
        InMemoryRaster::new(bands).unwrap()
    }

    #[test]
    fn test_worked_example_five_bands() {
        // Band 1 red = 50, band 2 nir = 200: mean NDVI 0.6. The other
        // bands stay within a 4:1 ratio of each other, so no other
        // pairing reaches 0.6
        let raster = uniform_raster(&[50.0, 200.0, 100.0, 120.0, 110.0], 4, 4);
        let mut notes = Vec::new();

        let search = search_band_combinations(&raster, &mut notes).unwrap();
        assert_eq!(search.best.red_band, 1);
        assert_eq!(search.best.nir_band, 2);
        assert!((search.best.ndvi_mean - 0.6).abs() < 1e-9);
        // 5 bands -> 20 ordered pairs
        assert_eq!(search.candidates.len(), 20);
    }

    #[test]
    fn test_never_selects_self_pair() {
        let raster = uniform_raster(&[10.0, 20.0, 30.0], 3, 3);
        let mut notes = Vec::new();

        let search = search_band_combinations(&raster, &mut notes).unwrap();
        assert_ne!(search.best.red_band, search.best.nir_band);
        for c in &search.candidates {
            assert_ne!(c.red_band, c.nir_band);
        }
        assert_eq!(search.candidates.len(), 6);
    }

    #[test]
    fn test_tie_break_prefers_enumeration_order() {
        // Identical bands: every pair scores 0.0, so the first ordered
        // pair (red=1, nir=2) must win
        let raster = uniform_raster(&[40.0, 40.0, 40.0], 3, 3);
        let mut notes = Vec::new();

        let search = search_band_combinations(&raster, &mut notes).unwrap();
        assert_eq!(search.best.red_band, 1);
        assert_eq!(search.best.nir_band, 2);
    }

    #[test]
    fn test_empty_shape_is_inconclusive() {
        // Zero-cell bands have no finite mean for any pair
        let raster = InMemoryRaster::new(vec![
            Band::zeros(0, 0),
            Band::zeros(0, 0),
        ])
        .unwrap();
        let mut notes = Vec::new();

        let err = search_band_combinations(&raster, &mut notes).unwrap_err();
        match err {
            Error::Inconclusive { diagnostics } => {
                assert!(diagnostics.contains("band 1"));
                assert!(diagnostics.contains("band 2"));
                assert!(diagnostics.contains("no valid samples"));
            }
            other => panic!("expected Inconclusive, got {:?}", other),
        }
    }

    #[test]
    fn test_candidate_means_bounded() {
        let raster = uniform_raster(&[12.0, 99.0, 55.0, 7.0], 5, 5);
        let mut notes = Vec::new();

        let search = search_band_combinations(&raster, &mut notes).unwrap();
        for c in &search.candidates {
            assert!(c.ndvi_mean >= -1.0 && c.ndvi_mean <= 1.0);
            assert!(c.ndvi_min <= c.ndvi_mean && c.ndvi_mean <= c.ndvi_max);
        }
    }
}
