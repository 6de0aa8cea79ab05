use serde::{Deserialize, Serialize};

/// Per-epoch training statistics recorded by `train_loop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean training loss over the epoch's training-mode forward passes.
    pub loss: f64,
    /// Training accuracy over the same passes, in [0, 1].
    pub accuracy: f64,
    /// Validation loss in inference mode, if a validation set was given.
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of this epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Everything `train_loop` recorded, oldest epoch first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    pub epochs: Vec<EpochStats>,
}

impl History {
    pub fn last(&self) -> Option<&EpochStats> {
        self.epochs.last()
    }

    /// Validation accuracy of the final epoch, if validation ran.
    pub fn final_val_accuracy(&self) -> Option<f64> {
        self.last().and_then(|s| s.val_accuracy)
    }
}
