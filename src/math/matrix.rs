use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{NetError, Result};

/// Row-major dense matrix used as a layer's weight arena.
///
/// For a layer, `rows` is the neuron count and `cols` the fan-in, so
/// `data[neuron][input]` is the weight of the edge `input -> neuron`.
/// Serialized as a plain nested array (`[[f64]]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: samples from N(0, sqrt(2 / cols)).
    ///
    /// `cols` is the fan-in. Pass a seeded RNG for reproducible weights.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / cols as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for w in row.iter_mut() {
                *w = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// Builds a matrix from rows, rejecting ragged input.
    ///
    /// An empty `data` yields a `0 x 0` matrix.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, |r| r.len());
        if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(NetError::dimension(format!("matrix row {}", i), cols, row.len()));
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major view: `data()[row][col]`.
    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    /// `W · x`: one dot product per row.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.cols);
        self.data
            .iter()
            .map(|row| row.iter().zip(x).map(|(w, v)| w * v).sum())
            .collect()
    }

    /// `Wᵀ · d`: for every column `j`, `Σ_k d[k] · W[k][j]`.
    ///
    /// Carries a layer's deltas back onto the units that feed it.
    pub fn transpose_mul_vec(&self, d: &[f64]) -> Vec<f64> {
        debug_assert_eq!(d.len(), self.rows);
        let mut res = vec![0.0; self.cols];
        for (row, dk) in self.data.iter().zip(d) {
            for (acc, w) in res.iter_mut().zip(row) {
                *acc += dk * w;
            }
        }
        res
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = NetError;

    fn try_from(data: Vec<Vec<f64>>) -> Result<Matrix> {
        Matrix::from_data(data)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.data
    }
}
