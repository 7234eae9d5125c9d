pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod store;
pub mod config;

// Convenience re-exports
pub use error::{NetError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::{Activation, Kernel};
pub use layers::dense::Layer;
pub use network::network::{ForwardPass, Network};
pub use network::spec::NetworkSpec;
pub use loss::squared::SquaredError;
pub use optim::sgd::Sgd;
pub use train::{train_loop, train_network, EpochStats, TrainConfig, TrainReport};
pub use data::{load_dataset, normalize_dataset, Dataset, NormalizationParams};
pub use store::{list_models, PersistedModel};
pub use config::{TrainingConfig, TrainingPlan};
