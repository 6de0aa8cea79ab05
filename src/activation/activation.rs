use serde::{Deserialize, Serialize};
use std::f64::consts::E;

/// Activation applied after a Dense layer's linear transform.
///
/// Serialized with the Keras identifiers so the same strings appear in
/// network specs and in the exported `model.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    #[serde(rename = "relu")]
    ReLU,
    Sigmoid,
    Tanh,
    /// Vector-valued; see [`Activation::apply`].
    Softmax,
}

impl Activation {
    /// Keras name of the activation, as written in a layer config.
    pub fn keras_name(&self) -> &'static str {
        match self {
            Activation::Linear => "linear",
            Activation::ReLU => "relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Softmax => "softmax",
        }
    }

    /// Parses a Keras activation name. Returns `None` for anything we do not
    /// implement.
    pub fn from_keras_name(name: &str) -> Option<Activation> {
        match name {
            "linear" => Some(Activation::Linear),
            "relu" => Some(Activation::ReLU),
            "sigmoid" => Some(Activation::Sigmoid),
            "tanh" => Some(Activation::Tanh),
            "softmax" => Some(Activation::Softmax),
            _ => None,
        }
    }

    /// Applies the activation to a full pre-activation vector.
    ///
    /// Softmax is computed over the whole vector with the maximum subtracted
    /// first; every other variant is element-wise.
    pub fn apply(&self, z: &[f64]) -> Vec<f64> {
        match self {
            Activation::Softmax => {
                let max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let exps: Vec<f64> = z.iter().map(|x| (x - max).exp()).collect();
                let sum: f64 = exps.iter().sum();
                exps.into_iter().map(|e| e / sum).collect()
            }
            _ => z.iter().map(|&x| self.function(x)).collect(),
        }
    }

    /// Pulls a gradient with respect to softmax outputs `probs` back to the
    /// logits: `∂L/∂z_i = p_i · (g_i - Σ_j g_j · p_j)`.
    pub fn softmax_backward(probs: &[f64], grad: &[f64]) -> Vec<f64> {
        let dot: f64 = probs.iter().zip(grad).map(|(p, g)| p * g).sum();
        probs.iter().zip(grad).map(|(p, g)| p * (g - dot)).collect()
    }

    /// Element-wise activation. Not meaningful for `Softmax`.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::ReLU => if x > 0.0 { x } else { 0.0 },
            Activation::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            Activation::Tanh => x.tanh(),
            Activation::Softmax => {
                panic!("Activation::Softmax is vector-valued; use Activation::apply()")
            }
        }
    }

    /// Element-wise derivative evaluated at the pre-activation `x`.
    ///
    /// For `Softmax` this is `1.0`: the delta handed to a softmax layer is
    /// already taken with respect to the logits (see
    /// `LossType::output_delta`).
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Activation::Linear => 1.0,
            Activation::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            Activation::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            Activation::Softmax => 1.0,
        }
    }
}
