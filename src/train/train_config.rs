use std::sync::mpsc;

use crate::error::{NetError, Result};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`        — maximum number of full passes over the data (>= 1)
/// - `learning_rate` — fixed gradient-descent step size (> 0)
/// - `error_goal`    — stop after the first epoch whose average error is
///                     strictly below this value
/// - `shuffle_seed`  — `None` visits samples in dataset order every epoch;
///                     `Some(seed)` reshuffles each epoch from a seeded RNG
/// - `progress_tx`   — optional channel sender; one `EpochStats` is sent per
///                     completed epoch. A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub error_goal: f64,
    pub shuffle_seed: Option<u64>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with fixed sample order and no progress channel.
    pub fn new(epochs: usize, learning_rate: f64, error_goal: f64) -> Self {
        TrainConfig {
            epochs,
            learning_rate,
            error_goal,
            shuffle_seed: None,
            progress_tx: None,
        }
    }

    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NetError::Config("epoch budget must be at least 1".into()));
        }
        if self.error_goal.is_nan() {
            return Err(NetError::Config("error goal must be a number".into()));
        }
        Ok(())
    }
}
