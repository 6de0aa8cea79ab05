/// Mean squared error over the output vector.
pub struct MseLoss;

impl MseLoss {
    /// L = (1/n) · Σ (predicted[i] - expected[i])²
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected)
            .map(|(p, y)| (p - y) * (p - y))
            .sum::<f64>() / n
    }

    /// ∂L/∂predicted[i] = 2 · (predicted[i] - expected[i]) / n
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        let scale = 2.0 / predicted.len() as f64;
        predicted.iter().zip(expected)
            .map(|(p, y)| scale * (p - y))
            .collect()
    }
}
