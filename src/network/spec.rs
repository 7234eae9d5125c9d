use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::{NetError, Result};

/// Describes a network's architecture before any weights exist.
///
/// Fields:
/// - `num_inputs`         — width of the input vector
/// - `hidden_layers`      — width of each hidden layer, input side first;
///                          may be empty (outputs wired straight to inputs)
/// - `hidden_activations` — one activation per hidden layer
/// - `num_outputs`        — width of the output vector
/// - `output_activation`  — activation of the output layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub num_inputs: usize,
    pub hidden_layers: Vec<usize>,
    pub hidden_activations: Vec<Activation>,
    pub num_outputs: usize,
    pub output_activation: Activation,
}

impl NetworkSpec {
    /// Builds a spec from registry names, resolving each one.
    pub fn from_names(
        num_inputs: usize,
        hidden_layers: Vec<usize>,
        hidden_activations: &[impl AsRef<str>],
        num_outputs: usize,
        output_activation: &str,
    ) -> Result<NetworkSpec> {
        let hidden_activations = hidden_activations
            .iter()
            .map(|n| Activation::from_name(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let spec = NetworkSpec {
            num_inputs,
            hidden_layers,
            hidden_activations,
            num_outputs,
            output_activation: Activation::from_name(output_activation)?,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks every width is positive and there is one activation per
    /// hidden layer.
    pub fn validate(&self) -> Result<()> {
        if self.num_inputs == 0 {
            return Err(NetError::Config("number of inputs must be at least 1".into()));
        }
        if self.num_outputs == 0 {
            return Err(NetError::Config("number of outputs must be at least 1".into()));
        }
        if let Some(i) = self.hidden_layers.iter().position(|&w| w == 0) {
            return Err(NetError::Config(format!(
                "hidden layer {} must have at least 1 neuron",
                i
            )));
        }
        if self.hidden_layers.len() != self.hidden_activations.len() {
            return Err(NetError::Config(format!(
                "{} hidden layers but {} hidden activations",
                self.hidden_layers.len(),
                self.hidden_activations.len()
            )));
        }
        Ok(())
    }

    /// Fan-in of each layer, hidden layers first and the output layer last.
    pub fn fan_ins(&self) -> Vec<usize> {
        std::iter::once(self.num_inputs)
            .chain(self.hidden_layers.iter().copied())
            .collect()
    }
}
