//! Capability traits for fitted artifacts

use ndarray::{Array1, Array2, ArrayView2};

use crate::InferenceError;

/// Fitted feature scaler
pub trait Scaler: Send + Sync {
    /// Input columns the scaler was fitted on, in order
    fn columns(&self) -> &[String];

    /// Scale a `(rows, columns)` table
    fn transform(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError>;
}

/// Fitted regression model
pub trait Model: Send + Sync {
    /// One prediction per input row
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError>;
}
