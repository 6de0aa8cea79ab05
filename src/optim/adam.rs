use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::optim::optimizer::Optimizer;

/// First and second moment estimates for one parameter tensor.
#[derive(Debug)]
struct Moments {
    beta1_t: f64,
    beta2_t: f64,
    v: Vec<f64>,
    s: Vec<f64>,
}

impl Moments {
    fn new(len: usize) -> Self {
        Moments { beta1_t: 1.0, beta2_t: 1.0, v: vec![0.0; len], s: vec![0.0; len] }
    }
}

/// Adam with bias correction folded into the step size.
#[derive(Debug)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    slots: HashMap<usize, Moments>,
}

impl Adam {
    /// Creates a new `Adam` optimizer. Moment buffers are allocated lazily the
    /// first time a slot is updated.
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Adam { learning_rate, beta1, beta2, epsilon, slots: HashMap::new() }
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, slot: usize, params: &mut [f64], grad: &[f64]) -> Result<()> {
        if grad.len() != params.len() {
            return Err(Error::SizeMismatch { expected: params.len(), actual: grad.len() });
        }

        let Self { learning_rate: lr, beta1: b1, beta2: b2, epsilon: eps, .. } = *self;

        let m = self.slots.entry(slot).or_insert_with(|| Moments::new(params.len()));
        if m.v.len() != params.len() {
            return Err(Error::SizeMismatch { expected: m.v.len(), actual: params.len() });
        }

        m.beta1_t *= b1;
        m.beta2_t *= b2;

        let bc1 = 1.0 - m.beta1_t;
        let bc2 = 1.0 - m.beta2_t;
        let step_size = lr * (bc2.sqrt() / bc1);

        params
            .iter_mut()
            .zip(grad)
            .zip(m.v.iter_mut())
            .zip(m.s.iter_mut())
            .for_each(|(((p, g), v), s)| {
                *v = b1 * *v + (1.0 - b1) * g;
                *s = b2 * *s + (1.0 - b2) * g * g;
                *p -= step_size * *v / (s.sqrt() + eps);
            });

        Ok(())
    }
}
