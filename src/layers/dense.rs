use rand::Rng;

use crate::{activation::Activation, math::Matrix};

/// Fully connected layer: `a = σ(x·W + b)`.
#[derive(Debug, Clone)]
pub struct Dense {
    pub name: String,
    pub weights: Matrix, // (input_size, units)
    pub biases: Vec<f64>,
    pub activation: Activation,
}

/// Gradients for one Dense layer, shaped like its parameters.
#[derive(Debug, Clone)]
pub struct DenseGradients {
    pub weights: Matrix,
    pub biases: Vec<f64>,
}

impl DenseGradients {
    pub fn zeros_like(layer: &Dense) -> DenseGradients {
        DenseGradients {
            weights: Matrix::zeros(layer.weights.rows, layer.weights.cols),
            biases: vec![0.0; layer.biases.len()],
        }
    }
}

impl Dense {
    /// Glorot-uniform kernel, zero bias (the Keras defaults).
    pub fn new<R: Rng + ?Sized>(
        name: impl Into<String>,
        input_size: usize,
        units: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Dense {
        Dense {
            name: name.into(),
            weights: Matrix::glorot_uniform(input_size, units, rng),
            biases: vec![0.0; units],
            activation,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    pub fn units(&self) -> usize {
        self.weights.cols
    }

    pub fn param_count(&self) -> usize {
        self.weights.rows * self.weights.cols + self.biases.len()
    }

    /// Pre-activation `z = x·W + b`.
    pub fn linear(&self, input: &[f64]) -> Vec<f64> {
        let mut z = self.weights.vec_mul(input);
        for (zi, b) in z.iter_mut().zip(&self.biases) {
            *zi += b;
        }
        z
    }

    /// Returns `(z, a)`; the trainer keeps `z` for the backward pass.
    pub fn feed_from(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let z = self.linear(input);
        let a = self.activation.apply(&z);
        (z, a)
    }

    /// Backward pass for one sample.
    ///
    /// `delta` is ∂L/∂a for this layer, `pre_activation` the `z` recorded on
    /// the forward pass and `input` the vector that was fed in. Gradients are
    /// accumulated into `grads`; the return value is ∂L/∂input.
    pub fn backward(
        &self,
        delta: &[f64],
        pre_activation: &[f64],
        input: &[f64],
        grads: &mut DenseGradients,
    ) -> Vec<f64> {
        // δ = error ⊙ σ'(z)
        let layer_delta: Vec<f64> = delta
            .iter()
            .zip(pre_activation)
            .map(|(d, &z)| d * self.activation.derivative(z))
            .collect();

        grads.weights.add_outer(input, &layer_delta, 1.0);
        for (g, d) in grads.biases.iter_mut().zip(&layer_delta) {
            *g += d;
        }

        self.weights.mul_vec(&layer_delta)
    }
}
