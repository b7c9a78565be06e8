//! Fitted Scaler Artifacts

use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::Scaler;
use crate::InferenceError;

/// Serialized scaler, as exported after fitting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`
    Standard {
        #[serde(default)]
        feature_names: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    /// `x * scale + min`
    MinMax {
        #[serde(default)]
        feature_names: Vec<String>,
        min: Vec<f64>,
        scale: Vec<f64>,
    },
}

impl ScalerArtifact {
    /// Column names the scaler was fitted on
    pub fn feature_names(&self) -> &[String] {
        match self {
            Self::Standard { feature_names, .. } | Self::MinMax { feature_names, .. } => feature_names,
        }
    }
}

#[derive(Debug, Clone)]
enum Transform {
    Standard { mean: Array1<f64>, scale: Array1<f64> },
    MinMax { min: Array1<f64>, scale: Array1<f64> },
}

/// Scaler loaded from a [`ScalerArtifact`]
#[derive(Debug, Clone)]
pub struct FittedScaler {
    columns: Vec<String>,
    transform: Transform,
}

impl FittedScaler {
    /// Validate an artifact's parameter lengths against its feature names
    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self, InferenceError> {
        if artifact.feature_names().is_empty() {
            return Err(InferenceError::MissingSchema);
        }

        let (columns, transform) = match artifact {
            ScalerArtifact::Standard { feature_names, mean, scale } => {
                check_len(&feature_names, "mean", mean.len())?;
                check_len(&feature_names, "scale", scale.len())?;
                // Constant features are fitted with a zero scale; leave them unscaled
                let scale = scale.into_iter().map(|s| if s == 0.0 { 1.0 } else { s }).collect();
                let transform = Transform::Standard {
                    mean: Array1::from_vec(mean),
                    scale: Array1::from_vec(scale),
                };
                (feature_names, transform)
            }
            ScalerArtifact::MinMax { feature_names, min, scale } => {
                check_len(&feature_names, "min", min.len())?;
                check_len(&feature_names, "scale", scale.len())?;
                let transform = Transform::MinMax {
                    min: Array1::from_vec(min),
                    scale: Array1::from_vec(scale),
                };
                (feature_names, transform)
            }
        };

        Ok(Self { columns, transform })
    }

    /// Load a JSON scaler artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading scaler from {}", path.display());

        let raw = fs::read_to_string(path)
            .map_err(|e| InferenceError::ArtifactLoad(format!("{}: {e}", path.display())))?;
        let artifact: ScalerArtifact = serde_json::from_str(&raw)
            .map_err(|e| InferenceError::ArtifactLoad(format!("{}: {e}", path.display())))?;

        Self::from_artifact(artifact)
    }
}

fn check_len(columns: &[String], field: &str, len: usize) -> Result<(), InferenceError> {
    if len == columns.len() {
        Ok(())
    } else {
        Err(InferenceError::ArtifactLoad(format!(
            "scaler has {} feature names but {len} {field} values",
            columns.len()
        )))
    }
}

impl Scaler for FittedScaler {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn transform(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        if rows.ncols() != self.columns.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("(_, {})", self.columns.len()),
                actual: format!("{:?}", rows.shape()),
            });
        }

        let scaled = match &self.transform {
            Transform::Standard { mean, scale } => (&rows - mean) / scale,
            Transform::MinMax { min, scale } => &rows * scale + min,
        };
        Ok(scaled)
    }
}
