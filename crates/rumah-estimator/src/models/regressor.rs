use crate::error::PredictError;
use crate::math::{Array1, Array2};

/// Contract shared by every trainable regressor in the crate.
///
/// Fit errors propagate through `anyhow`; prediction errors are tagged so
/// the endpoint can distinguish an unfitted model from a shape mismatch.
pub trait Regressor {
    /// Fit the model on a feature matrix and target vector.
    fn fit(&mut self, x: &Array2<f32>, y: &Array1<f32>) -> anyhow::Result<()>;

    /// Predict one value per input row.
    fn predict(&self, x: &Array2<f32>) -> Result<Array1<f32>, PredictError>;

    /// Human readable algorithm name.
    fn name(&self) -> &'static str;
}
