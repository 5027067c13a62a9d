//! Error types for CropSight

use thiserror::Error;

/// Main error type for CropSight operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in band of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Band size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Band {band} out of range: raster has {count} bands")]
    BandOutOfRange { band: usize, count: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Cannot decode raster: {0}")]
    Decode(String),

    #[error("Unsupported input: {0}")]
    InputFormat(String),

    #[error("No valid red/near-infrared band combination found:\n{diagnostics}")]
    Inconclusive { diagnostics: String },

    #[error("Feature '{name}' is not finite ({value}); refusing to classify")]
    InvalidFeature { name: &'static str, value: f64 },

    #[error("Classifier prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Invalid model: {0}")]
    Model(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CropSight operations
pub type Result<T> = std::result::Result<T, Error>;
