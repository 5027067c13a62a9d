//! Feature vector assembly
//!
//! The full-feature pipeline reads three positionally-assigned
//! auxiliary bands alongside the searched NDVI mean. The classifier is
//! not guaranteed to survive non-finite input, so the vector is
//! validated here, before any model call.

use crate::reader::read_band_or_zero;
use cropsight_core::{Error, RasterSource, Result};
use serde::Serialize;

/// Thermal band position in the fixed 5-band layout
pub const THERMAL_BAND: usize = 3;
/// Elevation band position in the fixed 5-band layout
pub const ELEVATION_BAND: usize = 4;
/// Digital terrain model band position in the fixed 5-band layout
pub const DTM_BAND: usize = 5;

/// The classifier's input contract: four finite means.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureVector {
    pub ndvi_mean: f64,
    pub thermal_mean: f64,
    pub elevation_mean: f64,
    pub dtm_mean: f64,
}

impl FeatureVector {
    /// Components in classifier input order
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.ndvi_mean,
            self.thermal_mean,
            self.elevation_mean,
            self.dtm_mean,
        ]
    }

    /// Reject any non-finite component, naming the first offender
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("ndvi_mean", self.ndvi_mean),
            ("thermal_mean", self.thermal_mean),
            ("elevation_mean", self.elevation_mean),
            ("dtm_mean", self.dtm_mean),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(Error::InvalidFeature { name, value });
            }
        }
        Ok(())
    }
}

/// Assemble the feature vector from the auxiliary bands and the
/// searched NDVI mean.
///
/// Auxiliary means ignore missing values. Fails with
/// [`Error::InvalidFeature`] if any component comes out non-finite;
/// this must short-circuit before the classifier sees the vector.
pub fn aggregate_features(
    source: &dyn RasterSource,
    ndvi_mean: f64,
    diagnostics: &mut Vec<String>,
) -> Result<FeatureVector> {
    let features = FeatureVector {
        ndvi_mean,
        thermal_mean: band_mean(source, THERMAL_BAND, diagnostics),
        elevation_mean: band_mean(source, ELEVATION_BAND, diagnostics),
        dtm_mean: band_mean(source, DTM_BAND, diagnostics),
    };
    features.validate()?;
    Ok(features)
}

/// Mean over a band's valid cells; NaN when no cell is valid
fn band_mean(source: &dyn RasterSource, band: usize, diagnostics: &mut Vec<String>) -> f64 {
    read_band_or_zero(source, band, diagnostics)
        .statistics()
        .mean
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropsight_core::{Band, InMemoryRaster};

    fn five_band_raster() -> InMemoryRaster {
        InMemoryRaster::new(vec![
            Band::filled(3, 3, 50.0),  // red
            Band::filled(3, 3, 200.0), // nir
            Band::filled(3, 3, 21.5),  // thermal
            Band::filled(3, 3, 840.0), // elevation
            Band::filled(3, 3, 812.0), // dtm
        ])
        .unwrap()
    }

    #[test]
    fn test_aggregate_fixed_layout() {
        let raster = five_band_raster();
        let mut notes = Vec::new();

        let features = aggregate_features(&raster, 0.6, &mut notes).unwrap();
        assert_eq!(features.ndvi_mean, 0.6);
        assert_eq!(features.thermal_mean, 21.5);
        assert_eq!(features.elevation_mean, 840.0);
        assert_eq!(features.dtm_mean, 812.0);
        assert_eq!(features.as_array(), [0.6, 21.5, 840.0, 812.0]);
    }

    #[test]
    fn test_auxiliary_means_ignore_nan() {
        let mut thermal = Band::filled(3, 3, 20.0);
        thermal.set(0, 0, f64::NAN).unwrap();
        thermal.set(1, 1, f64::NAN).unwrap();

        let raster = InMemoryRaster::new(vec![
            Band::filled(3, 3, 50.0),
            Band::filled(3, 3, 200.0),
            thermal,
            Band::filled(3, 3, 100.0),
            Band::filled(3, 3, 100.0),
        ])
        .unwrap();
        let mut notes = Vec::new();

        let features = aggregate_features(&raster, 0.5, &mut notes).unwrap();
        assert!((features.thermal_mean - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_nan_band_is_invalid_feature() {
        let raster = InMemoryRaster::new(vec![
            Band::filled(2, 2, 50.0),
            Band::filled(2, 2, 200.0),
            Band::filled(2, 2, f64::NAN), // thermal unusable
            Band::filled(2, 2, 100.0),
            Band::filled(2, 2, 100.0),
        ])
        .unwrap();
        let mut notes = Vec::new();

        let err = aggregate_features(&raster, 0.5, &mut notes).unwrap_err();
        match err {
            Error::InvalidFeature { name, .. } => assert_eq!(name, "thermal_mean"),
            other => panic!("expected InvalidFeature, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_ndvi_rejected() {
        let raster = five_band_raster();
        let mut notes = Vec::new();

        assert!(aggregate_features(&raster, f64::NAN, &mut notes).is_err());
        assert!(aggregate_features(&raster, f64::INFINITY, &mut notes).is_err());
    }
}
