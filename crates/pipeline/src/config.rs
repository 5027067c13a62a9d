//! Pipeline configuration
//!
//! The decision thresholds are deliberately named constants: earlier
//! revisions of this pipeline drifted between hard-coded values, so the
//! defaults live in exactly one place and every stage reads them from
//! [`PipelineConfig`].

use serde::Serialize;

/// NDVI mean below which a region is rejected as barren without
/// consulting the model.
pub const DEFAULT_THRESHOLD_LOW: f64 = 0.40;

/// Center of the confidence formula: confidence grows with the distance
/// of the NDVI mean from this anchor.
pub const DEFAULT_CONFIDENCE_ANCHOR: f64 = 0.50;

/// Distance at which confidence saturates at 100%.
pub const DEFAULT_CONFIDENCE_SCALE: f64 = 0.50;

/// Bands required by the full-feature pipeline: red, near-infrared,
/// thermal, elevation, terrain model.
pub const MIN_BANDS_FULL: usize = 5;

/// Bands required for a pure NDVI search: any two reflectance bands.
pub const MIN_BANDS_NDVI: usize = 2;

/// Which stages of the pipeline run for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Band search and threshold decision only; no auxiliary features,
    /// no model inference. Requires [`MIN_BANDS_NDVI`] bands.
    NdviOnly,
    /// Band search, auxiliary feature extraction and model inference.
    /// Requires [`MIN_BANDS_FULL`] bands.
    FullFeature,
}

impl OperatingMode {
    /// Minimum band count the mode can operate on
    pub fn min_bands(&self) -> usize {
        match self {
            OperatingMode::NdviOnly => MIN_BANDS_NDVI,
            OperatingMode::FullFeature => MIN_BANDS_FULL,
        }
    }
}

/// Tunable constants for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: OperatingMode,
    /// Fast-reject bound: NDVI means below this classify as unhealthy
    /// without invoking the model
    pub threshold_low: f64,
    /// Anchor of the confidence formula
    pub confidence_anchor: f64,
    /// Saturation distance of the confidence formula
    pub confidence_scale: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::FullFeature,
            threshold_low: DEFAULT_THRESHOLD_LOW,
            confidence_anchor: DEFAULT_CONFIDENCE_ANCHOR,
            confidence_scale: DEFAULT_CONFIDENCE_SCALE,
        }
    }
}

impl PipelineConfig {
    /// Config for the NDVI-only operating mode
    pub fn ndvi_only() -> Self {
        Self {
            mode: OperatingMode::NdviOnly,
            ..Self::default()
        }
    }
}
