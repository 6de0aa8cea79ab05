use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;
use crate::error::{Error, Result};

/// Shape and seed of the generated train/validation split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSpec {
    pub train_samples: usize,
    pub val_samples: usize,
    pub features: usize,
    pub classes: usize,
    pub seed: u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        SyntheticSpec { train_samples: 500, val_samples: 100, features: 4, classes: 3, seed: 42 }
    }
}

/// Generates `(train, validation)` from a single RNG seeded with `spec.seed`.
///
/// Draw order is fixed: training features, training labels, validation
/// features, validation labels. Features are uniform in `[0, 1)`, labels
/// uniform in `0..classes`, so the same spec always yields the same arrays.
pub fn synthetic_split(spec: &SyntheticSpec) -> Result<(Dataset, Dataset)> {
    if spec.features == 0 || spec.classes == 0 {
        return Err(Error::InvalidDataset("features and classes must be positive".into()));
    }
    let mut rng = StdRng::seed_from_u64(spec.seed);

    let train_x = uniform_rows(&mut rng, spec.train_samples, spec.features);
    let train_y = uniform_labels(&mut rng, spec.train_samples, spec.classes);
    let val_x = uniform_rows(&mut rng, spec.val_samples, spec.features);
    let val_y = uniform_labels(&mut rng, spec.val_samples, spec.classes);

    log::debug!(
        "generated {}+{} samples of width {} (seed {})",
        spec.train_samples, spec.val_samples, spec.features, spec.seed
    );
    Ok((
        Dataset::new(train_x, train_y, spec.classes)?,
        Dataset::new(val_x, val_y, spec.classes)?,
    ))
}

fn uniform_rows(rng: &mut StdRng, rows: usize, cols: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|_| (0..cols).map(|_| rng.gen::<f64>()).collect())
        .collect()
}

fn uniform_labels(rng: &mut StdRng, n: usize, classes: usize) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..classes)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_split_shapes() {
        let (train, val) = synthetic_split(&SyntheticSpec::default()).unwrap();
        assert_eq!(train.len(), 500);
        assert_eq!(val.len(), 100);
        assert_eq!(train.feature_width(), 4);
        assert_eq!(val.feature_width(), 4);
        assert!(train.inputs().iter().flatten().all(|&x| (0.0..1.0).contains(&x)));
        assert!(train.labels().iter().chain(val.labels()).all(|&l| l < 3));
    }

    #[test]
    fn same_seed_same_data() {
        let spec = SyntheticSpec::default();
        assert_eq!(synthetic_split(&spec).unwrap(), synthetic_split(&spec).unwrap());

        let other = SyntheticSpec { seed: 7, ..spec.clone() };
        assert_ne!(synthetic_split(&spec).unwrap().0, synthetic_split(&other).unwrap().0);
    }

    #[test]
    fn every_class_is_drawn() {
        let (train, _) = synthetic_split(&SyntheticSpec::default()).unwrap();
        for class in 0..3 {
            assert!(train.labels().contains(&class));
        }
    }

    #[test]
    fn rejects_zero_width() {
        let spec = SyntheticSpec { features: 0, ..SyntheticSpec::default() };
        assert!(synthetic_split(&spec).is_err());
    }
}
