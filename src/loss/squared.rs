/// Half sum of squared errors, the quantity online backpropagation descends.
pub struct SquaredError;

impl SquaredError {
    /// Scalar loss for one sample: 0.5·Σ(target − predicted)²
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        0.5 * predicted.iter().zip(expected.iter())
            .map(|(p, t)| (t - p).powi(2))
            .sum::<f64>()
    }

    /// Per-output residual: expected − predicted.
    ///
    /// This is the negative gradient of `loss()` with respect to each output,
    /// so adding a multiple of it moves the prediction toward the target.
    pub fn residual(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, t)| t - p)
            .collect()
    }
}
