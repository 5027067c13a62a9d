//! Two-stage decision engine
//!
//! Stage 1 rejects clearly barren regions on the NDVI mean alone.
//! Stage 2 assembles the feature vector and consults the classifier.
//! Single pass, no retries; a classifier failure degrades to the
//! threshold-only reading instead of failing the request.

use crate::config::{OperatingMode, PipelineConfig};
use crate::features::aggregate_features;
use crate::model::Classifier;
use cropsight_core::{Error, RasterSource, Result};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Smallest normalized label read as "healthy"
const HEALTHY_LABEL_MIN: f64 = 0.5;

/// Terminal classification of the imaged area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => f.write_str("healthy"),
            HealthStatus::Unhealthy => f.write_str("unhealthy"),
        }
    }
}

/// Confidence in the classification.
///
/// `NotApplicable` marks decisions the model did not (or could not)
/// weigh in on: threshold fast-rejects and failed predictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    NotApplicable,
    Percent(f64),
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::NotApplicable => f.write_str("not applicable"),
            Confidence::Percent(p) => write!(f, "{:.1}%", p),
        }
    }
}

/// Outcome of the decision stages for one request
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    pub status: HealthStatus,
    pub confidence: Confidence,
    /// Normalized classifier label, present only when the model ran
    pub raw_label: Option<f64>,
}

/// Run the two-stage decision procedure for a searched NDVI mean.
///
/// Stage 1 (threshold): below `threshold_low` the area is unhealthy and
/// the model is never invoked; confidence is not applicable.
///
/// Stage 2 (model, full-feature mode): the feature vector is assembled
/// and validated, the classifier label is normalized, and confidence is
/// `min(|ndvi_mean - confidence_anchor| / confidence_scale, 1.0) * 100`.
/// If prediction fails, the threshold-only reading (healthy, since the
/// mean cleared `threshold_low`) is reported with a diagnostic note and
/// no confidence, preserving the computed metrics.
///
/// In NDVI-only mode stage 2 is the threshold's complement: the mean
/// cleared the fast-reject bound, so the area reads healthy with the
/// formula confidence and no model label.
pub fn decide(
    source: &dyn RasterSource,
    ndvi_mean: f64,
    classifier: Option<&dyn Classifier>,
    config: &PipelineConfig,
    diagnostics: &mut Vec<String>,
) -> Result<Decision> {
    if ndvi_mean < config.threshold_low {
        info!(
            ndvi_mean,
            threshold_low = config.threshold_low,
            "below vegetation threshold, rejecting without model"
        );
        return Ok(Decision {
            status: HealthStatus::Unhealthy,
            confidence: Confidence::NotApplicable,
            raw_label: None,
        });
    }

    let confidence = Confidence::Percent(confidence_percent(ndvi_mean, config));

    match config.mode {
        OperatingMode::NdviOnly => Ok(Decision {
            status: HealthStatus::Healthy,
            confidence,
            raw_label: None,
        }),
        OperatingMode::FullFeature => {
            let features = aggregate_features(source, ndvi_mean, diagnostics)?;
            let classifier = classifier.ok_or_else(|| {
                Error::Model("full-feature mode requires a loaded classifier".to_string())
            })?;

            match classifier.predict(&features).and_then(|raw| raw.normalize()) {
                Ok(label) => {
                    let status = if label >= HEALTHY_LABEL_MIN {
                        HealthStatus::Healthy
                    } else {
                        HealthStatus::Unhealthy
                    };
                    info!(label, %status, "classifier decision");
                    Ok(Decision {
                        status,
                        confidence,
                        raw_label: Some(label),
                    })
                }
                Err(e) => {
                    let note = format!("prediction failed, reporting threshold result: {}", e);
                    warn!("{}", note);
                    diagnostics.push(note);
                    Ok(Decision {
                        status: HealthStatus::Healthy,
                        confidence: Confidence::NotApplicable,
                        raw_label: None,
                    })
                }
            }
        }
    }
}

/// `min(|ndvi_mean - anchor| / scale, 1.0) * 100`
fn confidence_percent(ndvi_mean: f64, config: &PipelineConfig) -> f64 {
    ((ndvi_mean - config.confidence_anchor).abs() / config.confidence_scale).min(1.0) * 100.0
}
