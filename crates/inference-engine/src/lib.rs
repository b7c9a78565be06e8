//! Price Inference Engine
//!
//! Runs schema-aligned feature rows through a fitted scaler and a
//! regression model to produce a single price estimate.

mod artifact;
mod model;
mod onnx;
mod pipeline;
mod scaler;

pub use artifact::{Model, Scaler};
pub use model::{load_model, LinearModel};
pub use onnx::OnnxRegressor;
pub use pipeline::PricePipeline;
pub use scaler::{FittedScaler, ScalerArtifact};

use feature_engine::SchemaError;
use thiserror::Error;

/// Errors during artifact loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Artifact load failed: {0}")]
    ArtifactLoad(String),
    #[error("Scaler does not expose feature names")]
    MissingSchema,
    #[error("Invalid feature schema: {0}")]
    InvalidSchema(#[from] SchemaError),
    #[error("Transform failed: {0}")]
    Transform(String),
    #[error("Prediction failed: {0}")]
    Prediction(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Model returned a non-finite value: {0}")]
    NonFinitePrediction(f64),
}

impl InferenceError {
    /// Whether the error can only occur while loading artifacts
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            InferenceError::ArtifactLoad(_)
                | InferenceError::MissingSchema
                | InferenceError::InvalidSchema(_)
        )
    }
}
