//! Classifier boundary
//!
//! The statistical model is an opaque collaborator: pre-trained, loaded
//! once at process start, and consumed through the [`Classifier`] trait.
//! Collaborator outputs are duck-typed (a bare label or a single-element
//! container), so normalization to a scalar happens here, once, instead
//! of being scattered through the decision logic.

use crate::features::FeatureVector;
use cropsight_core::{Error, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Probability above which the shipped logistic model emits label 1
pub const DECISION_POINT: f64 = 0.5;

/// A raw prediction as returned by a classifier implementation
#[derive(Debug, Clone, PartialEq)]
pub enum RawLabel {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl RawLabel {
    /// Fold either label form to a scalar.
    ///
    /// Container labels contribute their first element; an empty
    /// container is a prediction failure.
    pub fn normalize(&self) -> Result<f64> {
        match self {
            RawLabel::Scalar(v) => Ok(*v),
            RawLabel::Vector(v) => v.first().copied().ok_or_else(|| {
                Error::PredictionFailed("classifier returned an empty label container".to_string())
            }),
        }
    }
}

/// The predict capability consumed by the decision engine.
///
/// Implementations must be safe to share across concurrent requests:
/// the loaded model is process-wide, read-only state.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<RawLabel>;
}

/// Logistic-regression classifier over the four-feature vector.
///
/// Weights and bias come from a JSON model file written at training
/// time. The label is 1.0 when the sigmoid score exceeds
/// [`DECISION_POINT`], else 0.0.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearClassifier {
    weights: Vec<f64>,
    bias: f64,
}

impl LinearClassifier {
    pub fn new(weights: [f64; 4], bias: f64) -> Self {
        Self {
            weights: weights.to_vec(),
            bias,
        }
    }

    /// Load a model from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let model: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Model(e.to_string()))?;
        model.validate()
    }

    /// Parse a model from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self =
            serde_json::from_str(json).map_err(|e| Error::Model(e.to_string()))?;
        model.validate()
    }

    /// Reject models that cannot consume the feature vector
    fn validate(self) -> Result<Self> {
        if self.weights.len() != 4 {
            return Err(Error::Model(format!(
                "expected 4 weights, model has {}",
                self.weights.len()
            )));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::Model("non-finite weight or bias".to_string()));
        }
        Ok(self)
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<RawLabel> {
        let x = features.as_array();
        let z: f64 = self
            .weights
            .iter()
            .zip(x.iter())
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.bias;
        let p = 1.0 / (1.0 + (-z).exp());

        let label = if p > DECISION_POINT { 1.0 } else { 0.0 };
        Ok(RawLabel::Scalar(label))
    }
}
