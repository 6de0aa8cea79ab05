use serde::{Deserialize, Serialize};

use crate::loss::LossType;

/// Hyperparameters for a `train_loop` run.
///
/// # Fields
/// - `epochs`: total number of full passes over the training data
/// - `batch_size`: samples per mini-batch; use `1` for online updates
/// - `loss`: loss minimised by the loop
/// - `seed`: seeds the per-epoch shuffle and the dropout masks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub loss: LossType,
    pub seed: u64,
}

impl TrainConfig {
    pub fn new(epochs: usize, batch_size: usize, loss: LossType) -> Self {
        TrainConfig { epochs, batch_size, loss, ..TrainConfig::default() }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 20,
            batch_size: 32,
            loss: LossType::SparseCategoricalCrossentropy,
            seed: 42,
        }
    }
}
