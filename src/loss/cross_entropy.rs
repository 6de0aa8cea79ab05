/// Cross-entropy between a predicted distribution and a (one-hot) target.
pub struct CrossEntropyLoss;

const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// `-Σ y · ln(p + ε)`; with a one-hot target only the label's term
    /// survives.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        -expected.iter()
            .zip(predicted)
            .map(|(y, p)| y * (p + EPS).ln())
            .sum::<f64>()
    }

    /// Gradient with respect to the softmax logits feeding `predicted`.
    pub fn logits_gradient(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected).map(|(p, y)| p - y).collect()
    }

    /// Gradient with respect to `predicted` itself, for outputs that are not
    /// a softmax.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected).map(|(p, y)| -y / (p + EPS)).collect()
    }
}
