use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};

/// Per-column min/max captured from a training set.
///
/// Once a model is trained these vectors are authoritative: every later
/// input is normalized, and every prediction denormalized, with exactly these
/// values. They are never refit from another dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub input_min: Vec<f64>,
    pub input_max: Vec<f64>,
    pub target_min: Vec<f64>,
    pub target_max: Vec<f64>,
}

/// `(x − min) / (max − min)` per column; a constant column (`max == min`)
/// maps to `0`.
pub fn transform(row: &[f64], min: &[f64], max: &[f64]) -> Vec<f64> {
    row.iter()
        .zip(min.iter().zip(max))
        .map(|(&x, (&lo, &hi))| if hi == lo { 0.0 } else { (x - lo) / (hi - lo) })
        .collect()
}

/// Maps a normalized value back to raw scale: `value · (max − min) + min`.
pub fn inverse(value: f64, min: f64, max: f64) -> f64 {
    value * (max - min) + min
}

/// Running min/max over rows of equal width.
fn column_bounds<'a>(rows: impl Iterator<Item = &'a [f64]>, width: usize) -> (Vec<f64>, Vec<f64>) {
    let mut min = vec![f64::INFINITY; width];
    let mut max = vec![f64::NEG_INFINITY; width];
    for row in rows {
        for ((v, lo), hi) in row.iter().zip(min.iter_mut()).zip(max.iter_mut()) {
            if *v < *lo {
                *lo = *v;
            }
            if *v > *hi {
                *hi = *v;
            }
        }
    }
    (min, max)
}

impl NormalizationParams {
    /// Scans `dataset` once, tracking min/max per input and per target column.
    pub fn fit(dataset: &Dataset) -> Result<NormalizationParams> {
        if dataset.is_empty() {
            return Err(NetError::Data("cannot fit normalization on an empty dataset".into()));
        }
        let (input_min, input_max) =
            column_bounds(dataset.iter().map(|(x, _)| x), dataset.num_inputs());
        let (target_min, target_max) =
            column_bounds(dataset.iter().map(|(_, t)| t), dataset.num_outputs());

        let constant = input_min.iter().zip(&input_max).filter(|(lo, hi)| lo == hi).count()
            + target_min.iter().zip(&target_max).filter(|(lo, hi)| lo == hi).count();
        if constant > 0 {
            warn!(columns = constant, "constant columns will normalize to 0");
        }

        Ok(NormalizationParams {
            input_min,
            input_max,
            target_min,
            target_max,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.input_min.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.target_min.len()
    }

    /// Checks the four vectors pair up.
    pub fn validate(&self) -> Result<()> {
        NetError::check_len("input max vector", self.input_min.len(), self.input_max.len())?;
        NetError::check_len("target max vector", self.target_min.len(), self.target_max.len())
    }

    pub fn normalize_input(&self, row: &[f64]) -> Result<Vec<f64>> {
        NetError::check_len("raw input", self.num_inputs(), row.len())?;
        Ok(transform(row, &self.input_min, &self.input_max))
    }

    pub fn normalize_target(&self, row: &[f64]) -> Result<Vec<f64>> {
        NetError::check_len("raw target", self.num_outputs(), row.len())?;
        Ok(transform(row, &self.target_min, &self.target_max))
    }

    /// Maps a network output back to target scale using the stored vectors.
    pub fn denormalize_target(&self, row: &[f64]) -> Result<Vec<f64>> {
        NetError::check_len("network output", self.num_outputs(), row.len())?;
        Ok(row
            .iter()
            .zip(self.target_min.iter().zip(&self.target_max))
            .map(|(&v, (&lo, &hi))| inverse(v, lo, hi))
            .collect())
    }

    /// Normalizes every row of `dataset` with these parameters.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        let inputs = dataset
            .inputs()
            .iter()
            .map(|x| self.normalize_input(x))
            .collect::<Result<Vec<_>>>()?;
        let targets = dataset
            .targets()
            .iter()
            .map(|t| self.normalize_target(t))
            .collect::<Result<Vec<_>>>()?;
        Dataset::new(inputs, targets)
    }
}

/// Fits parameters on `dataset` and returns the normalized copy with them.
pub fn normalize_dataset(dataset: &Dataset) -> Result<(Dataset, NormalizationParams)> {
    let params = NormalizationParams::fit(dataset)?;
    let normalized = params.apply(dataset)?;
    Ok((normalized, params))
}
