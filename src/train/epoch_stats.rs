use std::fmt;

use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Epoch budget for this run.
    pub total_epochs: usize,
    /// Mean over the epoch's samples of 0.5·Σ(target − output)².
    pub avg_error: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// One progress line, e.g. `Epoch 3/1000, Error: 0.012345`.
impl fmt::Display for EpochStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch {}/{}, Error: {:.6}", self.epoch, self.total_epochs, self.avg_error)
    }
}

/// Outcome of a `train_loop` run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    /// Number of epochs actually completed.
    pub epochs_run: usize,
    /// Average error of the last completed epoch.
    pub final_error: f64,
    /// `true` when the loop stopped because `final_error < error_goal`.
    pub goal_reached: bool,
}
