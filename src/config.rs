use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::{NetError, Result};
use crate::network::spec::NetworkSpec;
use crate::train::train_config::TrainConfig;

pub const DEFAULT_NUM_OUTPUTS: usize = 1;
pub const DEFAULT_HIDDEN_LAYERS: [usize; 2] = [20, 20];
pub const DEFAULT_HIDDEN_ACTIVATION: Activation = Activation::Relu;
pub const DEFAULT_OUTPUT_ACTIVATION: Activation = Activation::Linear;
pub const DEFAULT_EPOCHS: usize = 1000;
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;
pub const DEFAULT_ERROR_GOAL: f64 = 0.001;

/// Training settings as they arrive from a config file or the command line.
/// Every field may be omitted; `resolve()` fills the gaps with defaults.
///
/// File format (JSON, all keys optional):
/// ```json
/// { "numOutputs": 1, "hiddenLayers": [20, 20],
///   "hiddenActivations": ["relu", "relu"], "outputActivation": "linear",
///   "epochs": 1000, "learningRate": 0.001, "errorGoal": 0.001,
///   "seed": 7, "shuffle": false }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrainingConfig {
    pub num_outputs: Option<usize>,
    pub hidden_layers: Option<Vec<usize>>,
    pub hidden_activations: Option<Vec<String>>,
    pub output_activation: Option<String>,
    pub epochs: Option<usize>,
    pub learning_rate: Option<f64>,
    pub error_goal: Option<f64>,
    /// Seeds weight initialization and, with `shuffle`, sample order.
    pub seed: Option<u64>,
    pub shuffle: Option<bool>,
}

/// Fully resolved settings for one training run, minus the input width,
/// which comes from the dataset.
#[derive(Debug, Clone)]
pub struct TrainingPlan {
    pub num_outputs: usize,
    pub hidden_layers: Vec<usize>,
    pub hidden_activations: Vec<Activation>,
    pub output_activation: Activation,
    pub seed: Option<u64>,
    pub train: TrainConfig,
}

impl TrainingConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<TrainingConfig> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| NetError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| NetError::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    // merge configs where the second overwrites the first
    pub fn merge(self, other: Self) -> Self {
        Self {
            num_outputs: other.num_outputs.or(self.num_outputs),
            hidden_layers: other.hidden_layers.or(self.hidden_layers),
            hidden_activations: other.hidden_activations.or(self.hidden_activations),
            output_activation: other.output_activation.or(self.output_activation),
            epochs: other.epochs.or(self.epochs),
            learning_rate: other.learning_rate.or(self.learning_rate),
            error_goal: other.error_goal.or(self.error_goal),
            seed: other.seed.or(self.seed),
            shuffle: other.shuffle.or(self.shuffle),
        }
    }

    /// Applies defaults and resolves activation names.
    ///
    /// Hidden activations default to `relu` for every hidden layer only when
    /// none are given at all; an explicit list of the wrong length is an error.
    pub fn resolve(self) -> Result<TrainingPlan> {
        let hidden_layers = self.hidden_layers.unwrap_or_else(|| DEFAULT_HIDDEN_LAYERS.to_vec());
        let hidden_activations = match self.hidden_activations {
            Some(names) => names
                .iter()
                .map(|n| Activation::from_name(n))
                .collect::<Result<Vec<_>>>()?,
            None => vec![DEFAULT_HIDDEN_ACTIVATION; hidden_layers.len()],
        };
        let output_activation = match self.output_activation {
            Some(name) => Activation::from_name(&name)?,
            None => DEFAULT_OUTPUT_ACTIVATION,
        };

        let mut train = TrainConfig::new(
            self.epochs.unwrap_or(DEFAULT_EPOCHS),
            self.learning_rate.unwrap_or(DEFAULT_LEARNING_RATE),
            self.error_goal.unwrap_or(DEFAULT_ERROR_GOAL),
        );
        if self.shuffle.unwrap_or(false) {
            train = train.with_shuffle(self.seed.unwrap_or_else(rand::random));
        }
        train.validate()?;
        if !(train.learning_rate.is_finite() && train.learning_rate > 0.0) {
            return Err(NetError::Config(format!(
                "learning rate must be a positive number, got {}",
                train.learning_rate
            )));
        }

        Ok(TrainingPlan {
            num_outputs: self.num_outputs.unwrap_or(DEFAULT_NUM_OUTPUTS),
            hidden_layers,
            hidden_activations,
            output_activation,
            seed: self.seed,
            train,
        })
    }
}

impl TrainingPlan {
    /// Network architecture for a dataset with `num_inputs` feature columns.
    pub fn network_spec(&self, num_inputs: usize) -> Result<NetworkSpec> {
        let spec = NetworkSpec {
            num_inputs,
            hidden_layers: self.hidden_layers.clone(),
            hidden_activations: self.hidden_activations.clone(),
            num_outputs: self.num_outputs,
            output_activation: self.output_activation,
        };
        spec.validate()?;
        Ok(spec)
    }
}
