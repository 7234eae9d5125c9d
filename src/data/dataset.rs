use crate::error::{NetError, Result};

/// Ordered `(input, target)` samples with uniform widths.
///
/// Stored as two parallel vectors; `new()` guarantees they have equal length
/// and that every row matches the first row's width.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Vec<Vec<f64>>,
    targets: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn new(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Result<Dataset> {
        NetError::check_len("dataset targets", inputs.len(), targets.len())?;
        if let (Some(x0), Some(t0)) = (inputs.first(), targets.first()) {
            for (i, (x, t)) in inputs.iter().zip(&targets).enumerate() {
                NetError::check_len(&format!("sample {} inputs", i), x0.len(), x.len())?;
                NetError::check_len(&format!("sample {} targets", i), t0.len(), t.len())?;
            }
        }
        Ok(Dataset { inputs, targets })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Input width, or 0 for an empty dataset.
    pub fn num_inputs(&self) -> usize {
        self.inputs.first().map_or(0, Vec::len)
    }

    /// Target width, or 0 for an empty dataset.
    pub fn num_outputs(&self) -> usize {
        self.targets.first().map_or(0, Vec::len)
    }

    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    pub fn targets(&self) -> &[Vec<f64>] {
        &self.targets
    }

    /// The `i`-th sample.
    pub fn sample(&self, i: usize) -> (&[f64], &[f64]) {
        (&self.inputs[i], &self.targets[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> + '_ {
        self.inputs
            .iter()
            .zip(&self.targets)
            .map(|(x, t)| (x.as_slice(), t.as_slice()))
    }
}
