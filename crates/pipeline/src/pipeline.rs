//! Request pipeline
//!
//! Wires the stages together for one raster: input validation, band
//! combination search, decision. One request owns all derived data;
//! nothing survives the request except the shared classifier.

use crate::config::{OperatingMode, PipelineConfig};
use crate::decision::{decide, Confidence, HealthStatus};
use crate::model::Classifier;
use crate::search::search_band_combinations;
use cropsight_core::{Error, RasterSource, Result};
use serde::Serialize;
use tracing::info;

/// The result record handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub status: HealthStatus,
    /// NDVI mean of the selected band combination
    pub ndvi_value: f64,
    pub confidence: Confidence,
    /// Normalized classifier label, present when the model stage ran
    pub raw_label: Option<f64>,
    /// Notes accumulated across the stages (recovered band reads,
    /// selected pairing, degraded predictions)
    pub diagnostics: Vec<String>,
}

/// Classify one raster.
///
/// Validates the band count for the operating mode before any band is
/// read, searches the best (red, nir) combination, and runs the
/// decision stages. Errors are the structural kinds of the taxonomy:
/// `InputFormat`, `Inconclusive`, `InvalidFeature`, `Model`.
pub fn classify(
    source: &dyn RasterSource,
    classifier: Option<&dyn Classifier>,
    config: &PipelineConfig,
) -> Result<Classification> {
    let count = source.band_count();
    let required = config.mode.min_bands();
    if count < required {
        return Err(Error::InputFormat(format!(
            "raster has {} band(s); {} mode requires at least {}",
            count,
            mode_name(config.mode),
            required
        )));
    }
    if config.mode == OperatingMode::FullFeature && classifier.is_none() {
        return Err(Error::Model(
            "full-feature mode requires a loaded classifier".to_string(),
        ));
    }

    let mut diagnostics = Vec::new();

    let search = search_band_combinations(source, &mut diagnostics)?;
    let best = search.best;
    info!(
        red = best.red_band,
        nir = best.nir_band,
        ndvi_mean = best.ndvi_mean,
        "selected band combination"
    );
    diagnostics.push(format!(
        "selected bands: red={}, nir={} (ndvi mean {:.4})",
        best.red_band, best.nir_band, best.ndvi_mean
    ));

    let decision = decide(source, best.ndvi_mean, classifier, config, &mut diagnostics)?;

    Ok(Classification {
        status: decision.status,
        ndvi_value: best.ndvi_mean,
        confidence: decision.confidence,
        raw_label: decision.raw_label,
        diagnostics,
    })
}

/// Boundary form of a request outcome: classification or described
/// failure, never a panic or a bare error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisReport {
    Classified(Classification),
    Failed { error: String },
}

/// Run [`classify`] and fold any error into the report.
///
/// This is the pipeline boundary of the error policy: conditions that
/// invalidate the statistical meaning of the result surface here as a
/// described failure rather than crossing into the caller as an error.
pub fn run_analysis(
    source: &dyn RasterSource,
    classifier: Option<&dyn Classifier>,
    config: &PipelineConfig,
) -> AnalysisReport {
    match classify(source, classifier, config) {
        Ok(classification) => AnalysisReport::Classified(classification),
        Err(e) => AnalysisReport::Failed {
            error: e.to_string(),
        },
    }
}

fn mode_name(mode: OperatingMode) -> &'static str {
    match mode {
        OperatingMode::NdviOnly => "ndvi-only",
        OperatingMode::FullFeature => "full-feature",
    }
}
