use rand::Rng;

/// Inverted dropout.
///
/// In training each unit survives with probability `1 - rate` and survivors
/// are scaled by `1 / (1 - rate)`, so inference is the identity.
#[derive(Debug, Clone)]
pub struct Dropout {
    pub name: String,
    pub rate: f64,
}

impl Dropout {
    pub fn new(name: impl Into<String>, rate: f64) -> Dropout {
        Dropout { name: name.into(), rate }
    }

    /// Draws a mask for one sample. Each entry is either `0.0` or the
    /// survivor scale, so the forward and backward passes are both a plain
    /// element-wise product with it.
    pub fn sample_mask<R: Rng + ?Sized>(&self, width: usize, rng: &mut R) -> Vec<f64> {
        if self.rate <= 0.0 {
            return vec![1.0; width];
        }
        let keep = 1.0 - self.rate;
        let scale = 1.0 / keep;
        (0..width)
            .map(|_| if rng.gen::<f64>() < keep { scale } else { 0.0 })
            .collect()
    }

    pub fn apply_mask(values: &[f64], mask: &[f64]) -> Vec<f64> {
        values.iter().zip(mask).map(|(v, m)| v * m).collect()
    }
}
