use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::loss::{cross_entropy::CrossEntropyLoss, mse::MseLoss};

/// Selects which loss the training loop minimises.
///
/// Targets are class indices; both losses compare the prediction with the
/// one-hot encoding of the label.
///
/// Either loss works with any output activation; [`LossType::output_delta`]
/// accounts for a softmax output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    SparseCategoricalCrossentropy,
    MeanSquaredError,
}

impl LossType {
    /// Keras identifier written to the exported training config.
    pub fn keras_name(&self) -> &'static str {
        match self {
            LossType::SparseCategoricalCrossentropy => "sparse_categorical_crossentropy",
            LossType::MeanSquaredError => "mean_squared_error",
        }
    }

    /// Scalar loss for one sample.
    pub fn loss(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossType::SparseCategoricalCrossentropy => CrossEntropyLoss::loss(predicted, expected),
            LossType::MeanSquaredError => MseLoss::loss(predicted, expected),
        }
    }

    /// `∂L/∂predicted` for one sample.
    pub fn derivative(&self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        match self {
            LossType::SparseCategoricalCrossentropy => CrossEntropyLoss::derivative(predicted, expected),
            LossType::MeanSquaredError => MseLoss::derivative(predicted, expected),
        }
    }

    /// The delta that starts the backward pass at an output layer with
    /// activation `output`.
    ///
    /// For a softmax output this is taken with respect to the logits, since
    /// softmax has no element-wise derivative; otherwise it is `∂L/∂predicted`
    /// and the layer applies its own activation derivative.
    pub fn output_delta(&self, predicted: &[f64], expected: &[f64], output: Activation) -> Vec<f64> {
        match (self, output) {
            (LossType::SparseCategoricalCrossentropy, Activation::Softmax) => {
                CrossEntropyLoss::logits_gradient(predicted, expected)
            }
            (LossType::MeanSquaredError, Activation::Softmax) => {
                Activation::softmax_backward(predicted, &MseLoss::derivative(predicted, expected))
            }
            _ => self.derivative(predicted, expected),
        }
    }
}

impl Default for LossType {
    fn default() -> Self {
        LossType::SparseCategoricalCrossentropy
    }
}

/// One-hot encoding of `label` over `classes` outputs.
pub fn one_hot(label: usize, classes: usize) -> Vec<f64> {
    let mut v = vec![0.0; classes];
    v[label] = 1.0;
    v
}
