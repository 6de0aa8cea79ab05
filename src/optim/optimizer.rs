use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::optim::{adam::Adam, sgd::Sgd};

/// Updates one parameter tensor from its averaged gradient.
///
/// `slot` identifies the tensor (the trainer uses `2·layer` for a kernel and
/// `2·layer + 1` for its bias) so stateful optimizers can keep per-tensor
/// moments.
pub trait Optimizer {
    fn update_params(&mut self, slot: usize, params: &mut [f64], grad: &[f64]) -> Result<()>;
}

/// Serializable optimizer choice, in the shape Keras writes it to a
/// training config: `{"class_name": "Adam", "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class_name", content = "config")]
pub enum OptimizerConfig {
    Adam {
        learning_rate: f64,
        beta_1: f64,
        beta_2: f64,
        epsilon: f64,
    },
    #[serde(rename = "SGD")]
    Sgd { learning_rate: f64 },
}

impl OptimizerConfig {
    /// Adam with the Keras default moments.
    pub fn adam(learning_rate: f64) -> Self {
        OptimizerConfig::Adam { learning_rate, beta_1: 0.9, beta_2: 0.999, epsilon: 1e-7 }
    }

    pub fn build(&self) -> Box<dyn Optimizer> {
        match *self {
            OptimizerConfig::Adam { learning_rate, beta_1, beta_2, epsilon } => {
                Box::new(Adam::new(learning_rate, beta_1, beta_2, epsilon))
            }
            OptimizerConfig::Sgd { learning_rate } => Box::new(Sgd::new(learning_rate)),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::adam(0.001)
    }
}
