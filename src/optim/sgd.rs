use crate::error::{Error, Result};
use crate::optim::optimizer::Optimizer;

/// Plain gradient descent: `p ← p − lr · g`.
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn update_params(&mut self, _slot: usize, params: &mut [f64], grad: &[f64]) -> Result<()> {
        if grad.len() != params.len() {
            return Err(Error::SizeMismatch { expected: params.len(), actual: grad.len() });
        }
        for (p, g) in params.iter_mut().zip(grad) {
            *p -= self.learning_rate * g;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let mut sgd = Sgd::new(0.1);
        let mut params = [1.0, -2.0];
        sgd.update_params(0, &mut params, &[10.0, -10.0]).unwrap();
        assert_eq!(params, [0.0, -1.0]);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let mut sgd = Sgd::new(0.1);
        let mut params = [1.0, 2.0];
        assert!(matches!(
            sgd.update_params(0, &mut params, &[1.0]),
            Err(Error::SizeMismatch { expected: 2, actual: 1 })
        ));
    }
}
