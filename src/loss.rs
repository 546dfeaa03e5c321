use ndarray::{Array1, ArrayView1};

use crate::error::{DqnError, Result};

/// Mean squared error, `mean((prediction - target)^2)`.
pub struct MeanSquaredError;

impl MeanSquaredError {
    fn check(prediction: &ArrayView1<f32>, target: &ArrayView1<f32>) -> Result<()> {
        if prediction.len() != target.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} targets", prediction.len()),
                format!("{} targets", target.len()),
            ));
        }
        if prediction.is_empty() {
            return Err(DqnError::EmptyBatch);
        }
        Ok(())
    }

    pub fn compute(prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<f32> {
        Self::check(&prediction, &target)?;
        let diff = &prediction - &target;
        Ok(diff.mapv(|d| d * d).sum() / prediction.len() as f32)
    }

    /// `d loss / d prediction`
    pub fn gradient(prediction: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<Array1<f32>> {
        Self::check(&prediction, &target)?;
        let n = prediction.len() as f32;
        Ok((&prediction - &target).mapv(|d| 2.0 * d / n))
    }
}
