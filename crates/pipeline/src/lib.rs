//! # CropSight Pipeline
//!
//! Vegetation-health classification for multi-band rasters.
//!
//! The pipeline takes a decoded raster with an unknown band layout,
//! searches every ordered (red, near-infrared) band pairing for the one
//! with the strongest NDVI signal, extracts auxiliary features
//! (thermal, elevation, terrain model), and classifies the imaged area
//! as healthy or unhealthy vegetation through a threshold fast-reject
//! followed by model inference.
//!
//! Stages:
//! - **reader**: fault-tolerant band reads (zeros on failure)
//! - **ndvi**: the vegetation index itself
//! - **search**: ordered-pair band combination search
//! - **features**: auxiliary band means and vector validation
//! - **model**: the classifier boundary and shipped logistic model
//! - **decision**: threshold short-circuit and model inference
//! - **pipeline**: request orchestration and the report boundary

pub mod config;
pub mod decision;
pub mod features;
pub mod model;
pub mod ndvi;
pub mod pipeline;
pub mod reader;
pub mod search;

pub use config::{OperatingMode, PipelineConfig};
pub use decision::{Confidence, Decision, HealthStatus};
pub use features::FeatureVector;
pub use model::{Classifier, LinearClassifier, RawLabel};
pub use pipeline::{classify, run_analysis, AnalysisReport, Classification};
pub use search::{search_band_combinations, BandSearch, NdviCandidate};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{OperatingMode, PipelineConfig};
    pub use crate::decision::{Confidence, HealthStatus};
    pub use crate::model::{Classifier, LinearClassifier};
    pub use crate::pipeline::{classify, run_analysis, AnalysisReport, Classification};
    pub use cropsight_core::prelude::*;
}
