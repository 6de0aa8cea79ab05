use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::network::Network;
use crate::tfjs;
use crate::train::argmax;

/// Outcome of classifying one input vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub predicted_class: usize,
    /// Probability of `predicted_class`.
    pub confidence: f64,
    pub probabilities: Vec<f64>,
}

/// A loaded model ready to classify inputs.
pub struct Classifier {
    network: Network,
}

impl Classifier {
    pub fn new(network: Network) -> Self {
        Classifier { network }
    }

    /// Loads an exported layers model from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        tfjs::load_layers_model(dir).map(Classifier::new)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Runs the model on one input. Inputs whose length differs from the
    /// model's input width are rejected.
    pub fn predict(&self, input: &[f64]) -> Result<Prediction> {
        let expected = self.network.input_size();
        if input.len() != expected {
            return Err(Error::InvalidInput { expected, actual: input.len() });
        }
        let probabilities = self.network.forward(input);
        let predicted_class = argmax(&probabilities);
        log::debug!("predicted class {predicted_class} for {input:?}");
        Ok(Prediction {
            predicted_class,
            confidence: probabilities[predicted_class],
            probabilities,
        })
    }

    /// One-line description of the model's input and output shapes.
    pub fn info(&self) -> String {
        format!(
            "Model loaded - Input: [null,{}], Output: [null,{}]",
            self.network.input_size(),
            self.network.output_size()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkSpec;
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn classifier() -> Classifier {
        Classifier::new(Network::from_spec(&NetworkSpec::default(), &mut StdRng::seed_from_u64(1)).unwrap())
    }

    #[test]
    fn predict_returns_a_distribution() {
        let p = classifier().predict(&[0.5, 0.5, 0.5, 0.5]).unwrap();
        assert_eq!(p.probabilities.len(), 3);
        assert_approx_eq!(p.probabilities.iter().sum::<f64>(), 1.0, 1e-9);
        assert_eq!(p.confidence, p.probabilities[p.predicted_class]);
        assert!(p.probabilities.iter().all(|&q| q <= p.confidence));
    }

    #[test]
    fn predict_rejects_wrong_width() {
        assert!(matches!(
            classifier().predict(&[1.0, 2.0]),
            Err(Error::InvalidInput { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn info_reports_shapes() {
        assert_eq!(classifier().info(), "Model loaded - Input: [null,4], Output: [null,3]");
    }

    #[test]
    fn prediction_serializes_camel_case() {
        let p = Prediction { predicted_class: 1, confidence: 0.5, probabilities: vec![0.25, 0.5, 0.25] };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["predictedClass"], 1);
        assert_eq!(json["confidence"], 0.5);
    }
}
