use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::{NetError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// On-disk shape of a network: dimensions, raw weight tensors and activation
/// names. Bound activation kernels are not part of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub num_inputs: usize,
    pub hidden_layers: Vec<usize>,
    pub num_outputs: usize,
    /// `[layer][neuron][input]`
    pub hidden_weights: Vec<Vec<Vec<f64>>>,
    /// `[output][last hidden unit]`
    pub output_weights: Vec<Vec<f64>>,
    pub hidden_biases: Vec<Vec<f64>>,
    pub output_biases: Vec<f64>,
    pub hidden_activations: Vec<String>,
    pub output_activation: String,
}

/// On-disk shape of a trained model: the network plus the normalization
/// vectors captured from its training set.
///
/// The vectors are optional here only so that a record written without them
/// can be recognized and rejected with a clear error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub neural_network: NetworkRecord,
    #[serde(default)]
    pub input_mins: Option<Vec<f64>>,
    #[serde(default)]
    pub input_maxs: Option<Vec<f64>>,
    #[serde(default)]
    pub target_mins: Option<Vec<f64>>,
    #[serde(default)]
    pub target_maxs: Option<Vec<f64>>,
}

impl From<&Network> for NetworkRecord {
    fn from(net: &Network) -> Self {
        NetworkRecord {
            num_inputs: net.num_inputs(),
            hidden_layers: net.hidden_layers(),
            num_outputs: net.num_outputs(),
            hidden_weights: net.hidden.iter().map(|l| l.weights.data.clone()).collect(),
            output_weights: net.output.weights.data.clone(),
            hidden_biases: net.hidden.iter().map(|l| l.biases.clone()).collect(),
            output_biases: net.output.biases.clone(),
            hidden_activations: net
                .hidden
                .iter()
                .map(|l| l.activation.name().to_string())
                .collect(),
            output_activation: net.output.activation.name().to_string(),
        }
    }
}

impl NetworkRecord {
    /// Rebuilds the network: checks every declared dimension against the
    /// stored tensors, resolves activation names through the registry and
    /// binds their kernels.
    pub fn into_network(self) -> Result<Network> {
        let n_hidden = self.hidden_layers.len();
        for (what, len) in [
            ("hiddenWeights", self.hidden_weights.len()),
            ("hiddenBiases", self.hidden_biases.len()),
            ("hiddenActivations", self.hidden_activations.len()),
        ] {
            if len != n_hidden {
                return Err(NetError::Persistence(format!(
                    "{} has {} entries but hiddenLayers lists {} layers",
                    what, len, n_hidden
                )));
            }
        }

        let mut hidden = Vec::with_capacity(n_hidden);
        for (i, ((weights, biases), name)) in self
            .hidden_weights
            .into_iter()
            .zip(self.hidden_biases)
            .zip(&self.hidden_activations)
            .enumerate()
        {
            let layer = build_layer(weights, biases, name, &format!("hidden layer {}", i))?;
            if layer.size() != self.hidden_layers[i] {
                return Err(NetError::Persistence(format!(
                    "hidden layer {} has {} neurons but hiddenLayers declares {}",
                    i,
                    layer.size(),
                    self.hidden_layers[i]
                )));
            }
            hidden.push(layer);
        }

        let output = build_layer(
            self.output_weights,
            self.output_biases,
            &self.output_activation,
            "output layer",
        )?;
        if output.size() != self.num_outputs {
            return Err(NetError::Persistence(format!(
                "output layer has {} neurons but numOutputs declares {}",
                output.size(),
                self.num_outputs
            )));
        }

        // from_parts binds the activation kernels.
        Network::from_parts(self.num_inputs, hidden, output)
            .map_err(|e| NetError::Persistence(format!("inconsistent network record: {}", e)))
    }
}

fn build_layer(weights: Vec<Vec<f64>>, biases: Vec<f64>, activation: &str, what: &str) -> Result<Layer> {
    let activation = Activation::from_name(activation)
        .map_err(|e| NetError::Persistence(format!("{}: {}", what, e)))?;
    Matrix::from_data(weights)
        .and_then(|w| Layer::from_parts(w, biases, activation))
        .map_err(|e| NetError::Persistence(format!("{}: {}", what, e)))
}
