//! ONNX regressor backed by tract

use std::path::Path;

use ndarray::{Array1, ArrayView2};
use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::artifact::Model;
use crate::InferenceError;

/// Regression graph exported to ONNX, taking `f32[1, n]` and returning one value
pub struct OnnxRegressor {
    plan: TypedRunnableModel<TypedModel>,
    n_features: usize,
}

impl OnnxRegressor {
    /// Load and optimize an ONNX graph with a fixed `[1, n_features]` input
    pub fn load(path: &Path, n_features: usize) -> Result<Self, InferenceError> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.with_input_fact(0, f32::fact([1, n_features]).into()))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| InferenceError::ArtifactLoad(format!("{}: {e}", path.display())))?;

        info!("ONNX model loaded: {} input features", n_features);
        Ok(Self { plan, n_features })
    }

    fn run_row(&self, row: &[f32]) -> Result<f64, InferenceError> {
        let input = Tensor::from_shape(&[1, self.n_features], row)
            .map_err(|e| InferenceError::Prediction(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::Prediction(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::Prediction("model produced no outputs".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Prediction(e.to_string()))?;

        view.iter()
            .next()
            .map(|v| f64::from(*v))
            .ok_or_else(|| InferenceError::Prediction("model output is empty".to_string()))
    }
}

impl Model for OnnxRegressor {
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        if rows.ncols() != self.n_features {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("(_, {})", self.n_features),
                actual: format!("{:?}", rows.shape()),
            });
        }

        let mut out = Vec::with_capacity(rows.nrows());
        for row in rows.rows() {
            let row: Vec<f32> = row.iter().map(|v| *v as f32).collect();
            out.push(self.run_row(&row)?);
        }
        debug!("ONNX inference over {} rows", out.len());

        Ok(Array1::from_vec(out))
    }
}
