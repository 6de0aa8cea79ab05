use crate::error::{Error, Result};

/// Feature rows paired with integer class labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Vec<Vec<f64>>,
    labels: Vec<usize>,
    num_classes: usize,
}

impl Dataset {
    /// Checks that there is one label per row, every row has the same width,
    /// and every label is below `num_classes`.
    pub fn new(inputs: Vec<Vec<f64>>, labels: Vec<usize>, num_classes: usize) -> Result<Dataset> {
        if inputs.len() != labels.len() {
            return Err(Error::InvalidDataset(format!(
                "{} rows but {} labels",
                inputs.len(),
                labels.len()
            )));
        }
        if let Some(first) = inputs.first() {
            let width = first.len();
            if let Some(i) = inputs.iter().position(|row| row.len() != width) {
                return Err(Error::InvalidDataset(format!(
                    "row {i} has {} features, expected {width}",
                    inputs[i].len()
                )));
            }
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= num_classes) {
            return Err(Error::InvalidDataset(format!(
                "label {bad} out of range for {num_classes} classes"
            )));
        }
        Ok(Dataset { inputs, labels, num_classes })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Width of each row; `0` for an empty dataset.
    pub fn feature_width(&self) -> usize {
        self.inputs.first().map_or(0, Vec::len)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_consistent_data() {
        let ds = Dataset::new(vec![vec![0.0, 1.0], vec![1.0, 0.0]], vec![0, 2], 3).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.feature_width(), 2);
        assert_eq!(ds.num_classes(), 3);
        assert!(!ds.is_empty());
    }

    #[test]
    fn rejects_inconsistent_data() {
        assert!(matches!(
            Dataset::new(vec![vec![0.0]], vec![], 2),
            Err(Error::InvalidDataset(_))
        ));
        assert!(Dataset::new(vec![vec![0.0, 1.0], vec![1.0]], vec![0, 1], 2).is_err());
        assert!(Dataset::new(vec![vec![0.0]], vec![2], 2).is_err());
    }
}
