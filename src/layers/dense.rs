use rand::Rng;

use crate::activation::activation::{Activation, Kernel};
use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

/// A fully connected layer: `a = f(W·x + b)`.
///
/// `weights` is `size x input_size` (one row per neuron). The bound `kernel`
/// is derived from `activation` and is never persisted.
#[derive(Debug, Clone)]
pub struct Layer {
    pub(crate) weights: Matrix,
    pub(crate) biases: Vec<f64>,
    pub(crate) activation: Activation,
    kernel: Kernel,
}

impl Layer {
    /// He-initialized weights, zero biases.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Layer {
        Layer {
            weights: Matrix::he(size, input_size, rng),
            biases: vec![0.0; size],
            activation,
            kernel: activation.kernel(),
        }
    }

    /// Builds a layer from explicit parameters. `biases` must have one entry
    /// per weight row and the matrix must have at least one column.
    pub fn from_parts(weights: Matrix, biases: Vec<f64>, activation: Activation) -> Result<Layer> {
        NetError::check_len("layer biases", weights.rows, biases.len())?;
        if weights.rows == 0 || weights.cols == 0 {
            return Err(NetError::Config(format!(
                "layer weights must be non-empty, got {}x{}",
                weights.rows, weights.cols
            )));
        }
        Ok(Layer {
            weights,
            biases,
            activation,
            kernel: activation.kernel(),
        })
    }

    /// Number of neurons.
    pub fn size(&self) -> usize {
        self.weights.rows
    }

    /// Fan-in: width of the vector this layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Re-resolves the activation's function pair.
    pub fn bind_function(&mut self) {
        self.kernel = self.activation.kernel();
    }

    /// Forward pass over one input vector. Pure.
    pub fn feed_from(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .mul_vec(input)
            .into_iter()
            .zip(&self.biases)
            .map(|(z, b)| (self.kernel.activate)(z + b))
            .collect()
    }

    /// `δ_j = error_j · f'(output_j)`, with `f'` taken on the activated output.
    pub fn deltas(&self, errors: &[f64], outputs: &[f64]) -> Vec<f64> {
        errors
            .iter()
            .zip(outputs)
            .map(|(e, v)| e * (self.kernel.derivative)(*v))
            .collect()
    }

    /// Error owed by each unit feeding this layer: `Wᵀ · δ`.
    ///
    /// Must run before `apply_deltas()` so it sees pre-update weights.
    pub fn back_errors(&self, deltas: &[f64]) -> Vec<f64> {
        self.weights.transpose_mul_vec(deltas)
    }

    /// `w_jk += lr · δ_j · a_k` and `b_j += lr · δ_j`.
    pub fn apply_deltas(&mut self, deltas: &[f64], inputs: &[f64], lr: f64) {
        for ((row, bias), d) in self.weights.data.iter_mut().zip(&mut self.biases).zip(deltas) {
            let step = lr * d;
            for (w, a) in row.iter_mut().zip(inputs) {
                *w += step * a;
            }
            *bias += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(weights: Vec<Vec<f64>>, biases: Vec<f64>, act: Activation) -> Layer {
        Layer::from_parts(Matrix::from_data(weights).unwrap(), biases, act).unwrap()
    }

    #[test]
    fn feed_from_applies_weights_bias_and_activation() {
        let l = layer(vec![vec![1.0, -1.0], vec![0.5, 0.5]], vec![0.0, -2.0], Activation::Relu);
        assert_eq!(l.feed_from(&[3.0, 1.0]), vec![2.0, 0.0]);
    }

    #[test]
    fn apply_deltas_moves_weights_along_inputs() {
        let mut l = layer(vec![vec![0.0, 0.0]], vec![0.0], Activation::Linear);
        l.apply_deltas(&[2.0], &[1.0, -3.0], 0.5);
        assert_eq!(l.weights.data, vec![vec![1.0, -3.0]]);
        assert_eq!(l.biases, vec![1.0]);
    }

    #[test]
    fn from_parts_rejects_bias_mismatch() {
        let w = Matrix::from_data(vec![vec![1.0], vec![2.0]]).unwrap();
        assert!(matches!(
            Layer::from_parts(w, vec![0.0], Activation::Linear),
            Err(NetError::Dimension { expected: 2, actual: 1, .. })
        ));
    }
}
