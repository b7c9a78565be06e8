//! Regression Model Artifacts

use std::fs;
use std::path::Path;

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::Model;
use crate::onnx::OnnxRegressor;
use crate::InferenceError;

/// Linear regressor, `rows · coefficients + intercept`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Load a JSON linear model from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| InferenceError::ArtifactLoad(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| InferenceError::ArtifactLoad(format!("{}: {e}", path.display())))
    }
}

impl Model for LinearModel {
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        if rows.ncols() != self.coefficients.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("(_, {})", self.coefficients.len()),
                actual: format!("{:?}", rows.shape()),
            });
        }

        let coefficients = ArrayView2::from_shape((self.coefficients.len(), 1), &self.coefficients[..])
            .map_err(|e| InferenceError::Prediction(e.to_string()))?;
        Ok(rows.dot(&coefficients).column(0).mapv(|v| v + self.intercept))
    }
}

/// Load a model artifact, choosing the format from the file extension
///
/// `n_features` fixes the input width for formats that need it up front.
pub fn load_model(path: impl AsRef<Path>, n_features: usize) -> Result<Box<dyn Model>, InferenceError> {
    let path = path.as_ref();
    info!("Loading model from {}", path.display());

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let model = LinearModel::load(path)?;
            if model.coefficients.len() != n_features {
                return Err(InferenceError::ArtifactLoad(format!(
                    "model has {} coefficients, scaler has {n_features} features",
                    model.coefficients.len()
                )));
            }
            Ok(Box::new(model))
        }
        Some("onnx") => Ok(Box::new(OnnxRegressor::load(path, n_features)?)),
        _ => Err(InferenceError::ArtifactLoad(format!(
            "unsupported model format: {}",
            path.display()
        ))),
    }
}
