use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::error::{Error, Result};

/// Describes one layer in a network specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    /// Fully connected layer with `units` outputs.
    Dense {
        units: usize,
        activation: Activation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Inverted dropout with drop probability `rate` in `[0, 1)`.
    Dropout {
        rate: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl LayerSpec {
    pub fn dense(units: usize, activation: Activation) -> Self {
        LayerSpec::Dense { units, activation, name: None }
    }

    pub fn named_dense(name: &str, units: usize, activation: Activation) -> Self {
        LayerSpec::Dense { units, activation, name: Some(name.to_owned()) }
    }

    pub fn dropout(rate: f64) -> Self {
        LayerSpec::Dropout { rate, name: None }
    }

    fn explicit_name(&self) -> Option<&str> {
        match self {
            LayerSpec::Dense { name, .. } | LayerSpec::Dropout { name, .. } => name.as_deref(),
        }
    }

    /// Keras layer class, also the stem for auto-generated names.
    fn class_stem(&self) -> &'static str {
        match self {
            LayerSpec::Dense { .. } => "dense",
            LayerSpec::Dropout { .. } => "dropout",
        }
    }
}

/// A serializable description of a sequential network: its name, the input
/// width and the ordered layers (input → output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    pub input_size: usize,
    pub layers: Vec<LayerSpec>,
}

impl Default for NetworkSpec {
    /// 4 → Dense(64, relu) → Dropout(0.2) → Dense(32, relu) → Dropout(0.2)
    /// → Dense(3, softmax).
    fn default() -> Self {
        NetworkSpec {
            name: "sequential".to_owned(),
            input_size: 4,
            layers: vec![
                LayerSpec::named_dense("dense_1", 64, Activation::ReLU),
                LayerSpec::dropout(0.2),
                LayerSpec::named_dense("dense_2", 32, Activation::ReLU),
                LayerSpec::dropout(0.2),
                LayerSpec::named_dense("output", 3, Activation::Softmax),
            ],
        }
    }
}

impl NetworkSpec {
    /// Checks the structural invariants: a positive input width, at least one
    /// layer, positive unit counts, dropout rates in `[0, 1)`, a Dense output
    /// layer, softmax only on the output, and unique explicit names.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::InvalidSpec("input_size must be positive".into()));
        }
        let last = self.layers.len().checked_sub(1)
            .ok_or_else(|| Error::InvalidSpec("network has no layers".into()))?;

        let mut seen = HashSet::new();
        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                LayerSpec::Dense { units, activation, .. } => {
                    if *units == 0 {
                        return Err(Error::InvalidSpec(format!("layer {i}: units must be positive")));
                    }
                    if *activation == Activation::Softmax && i != last {
                        return Err(Error::InvalidSpec(format!(
                            "layer {i}: softmax is only supported on the output layer"
                        )));
                    }
                }
                LayerSpec::Dropout { rate, .. } => {
                    if !(0.0..1.0).contains(rate) {
                        return Err(Error::InvalidSpec(format!(
                            "layer {i}: dropout rate {rate} outside [0, 1)"
                        )));
                    }
                    if i == last {
                        return Err(Error::InvalidSpec("the output layer must be dense".into()));
                    }
                }
            }
            if let Some(name) = layer.explicit_name() {
                if !seen.insert(name) {
                    return Err(Error::InvalidSpec(format!("duplicate layer name '{name}'")));
                }
            }
        }
        Ok(())
    }

    /// Resolves every layer's name. Explicit names are kept; the rest get
    /// Keras-style names (`dense`, `dense_1`, ..., `dropout`, `dropout_1`, ...)
    /// skipping anything already taken.
    pub fn layer_names(&self) -> Vec<String> {
        let mut taken: HashSet<String> = self.layers.iter()
            .filter_map(|l| l.explicit_name().map(str::to_owned))
            .collect();
        let mut counters = [0usize; 2];

        self.layers.iter()
            .map(|layer| {
                if let Some(name) = layer.explicit_name() {
                    return name.to_owned();
                }
                let stem = layer.class_stem();
                let counter = match layer {
                    LayerSpec::Dense { .. } => &mut counters[0],
                    LayerSpec::Dropout { .. } => &mut counters[1],
                };
                loop {
                    let candidate = if *counter == 0 {
                        stem.to_owned()
                    } else {
                        format!("{stem}_{counter}")
                    };
                    *counter += 1;
                    if taken.insert(candidate.clone()) {
                        return candidate;
                    }
                }
            })
            .collect()
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_is_valid() {
        let spec = NetworkSpec::default();
        spec.validate().unwrap();
        assert_eq!(spec.input_size, 4);
        assert_eq!(
            spec.layer_names(),
            vec!["dense_1", "dropout", "dense_2", "dropout_1", "output"]
        );
    }

    #[test]
    fn auto_names_skip_explicit_ones() {
        let spec = NetworkSpec {
            name: "m".into(),
            input_size: 2,
            layers: vec![
                LayerSpec::dense(4, Activation::ReLU),
                LayerSpec::named_dense("dense_1", 4, Activation::ReLU),
                LayerSpec::dense(2, Activation::Softmax),
            ],
        };
        assert_eq!(spec.layer_names(), vec!["dense", "dense_1", "dense_2"]);
    }

    #[test]
    fn validate_rejects_bad_specs() {
        let base = NetworkSpec::default();

        let mut s = base.clone();
        s.layers.clear();
        assert!(matches!(s.validate(), Err(Error::InvalidSpec(_))));

        let mut s = base.clone();
        s.layers.push(LayerSpec::dropout(0.5));
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.layers[1] = LayerSpec::dropout(1.0);
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.layers[0] = LayerSpec::dense(0, Activation::ReLU);
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.layers[0] = LayerSpec::named_dense("output", 8, Activation::ReLU);
        assert!(s.validate().is_err());

        let mut s = base;
        s.layers[0] = LayerSpec::dense(8, Activation::Softmax);
        assert!(s.validate().is_err());
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(LayerSpec::dense(3, Activation::Softmax)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "dense", "units": 3, "activation": "softmax"}));

        let parsed: LayerSpec = serde_json::from_str(r#"{"type":"dropout","rate":0.1}"#).unwrap();
        assert_eq!(parsed, LayerSpec::dropout(0.1));
    }
}
