use std::collections::HashMap;
use std::fs;
use std::io::BufReader;
use std::path::Path;

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::layers::{Dense, Dropout};
use crate::math::Matrix;
use crate::network::{Layer, Network};
use crate::tfjs::export::MODEL_JSON;
use crate::tfjs::topology::{LayerConfig, ModelJson, FLOAT32, LAYERS_MODEL_FORMAT};
use crate::tfjs::weights::{decode_f32_le, read_shards};

/// Parses `dir/model.json` without touching the weight shards.
pub fn read_model_json(dir: impl AsRef<Path>) -> Result<ModelJson> {
    let path = dir.as_ref().join(MODEL_JSON);
    let file = fs::File::open(&path).map_err(|e| Error::io(&path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Loads a Sequential layers model written by [`save_layers_model`] (or by
/// the TensorFlow.js converter, as long as it only uses Dense and Dropout
/// layers with float32 weights).
///
/// [`save_layers_model`]: crate::tfjs::save_layers_model
pub fn load_layers_model(dir: impl AsRef<Path>) -> Result<Network> {
    let dir = dir.as_ref();
    let model = read_model_json(dir)?;

    if let Some(format) = model.format.as_deref() {
        if format != LAYERS_MODEL_FORMAT {
            return Err(Error::Unsupported(format!("format '{format}'")));
        }
    }
    let topology = &model.model_topology;
    if topology.class_name != "Sequential" {
        return Err(Error::Unsupported(format!("model class '{}'", topology.class_name)));
    }

    let mut tensors = read_weights(dir, &model)?;

    let input_size = topology.config.layers.iter()
        .find_map(LayerConfig::batch_input_shape)
        .and_then(|shape| shape.last().copied().flatten())
        .ok_or_else(|| Error::Unsupported("no batch_input_shape in topology".into()))?;

    let mut width = input_size;
    let mut layers = Vec::new();
    for config in &topology.config.layers {
        match config {
            LayerConfig::InputLayer(_) => {}
            LayerConfig::Dense(c) => {
                let activation = Activation::from_keras_name(&c.activation)
                    .ok_or_else(|| Error::Unsupported(format!("activation '{}'", c.activation)))?;
                let kernel = take_tensor(&mut tensors, &format!("{}/kernel", c.name), &[width, c.units])?;
                let biases = if c.use_bias {
                    take_tensor(&mut tensors, &format!("{}/bias", c.name), &[c.units])?
                } else {
                    vec![0.0; c.units]
                };
                layers.push(Layer::Dense(Dense {
                    name: c.name.clone(),
                    weights: Matrix::from_vec(width, c.units, kernel)?,
                    biases,
                    activation,
                }));
                width = c.units;
            }
            LayerConfig::Dropout(c) => layers.push(Layer::Dropout(Dropout::new(c.name.clone(), c.rate))),
        }
    }

    let network = Network::from_layers(topology.config.name.clone(), input_size, layers)?;
    log::info!(
        "loaded '{}' from {}: {} -> {}",
        network.name,
        dir.display(),
        network.input_size(),
        network.output_size()
    );
    Ok(network)
}

/// Reads every weight group and slices it into named tensors.
fn read_weights(dir: &Path, model: &ModelJson) -> Result<HashMap<String, (Vec<usize>, Vec<f64>)>> {
    let mut tensors = HashMap::new();
    for group in &model.weights_manifest {
        if let Some(entry) = group.weights.iter().find(|w| w.dtype != FLOAT32) {
            return Err(Error::Unsupported(format!("dtype '{}' for '{}'", entry.dtype, entry.name)));
        }
        let values = decode_f32_le(&read_shards(dir, &group.paths)?)?;
        let expected: usize = group.weights.iter().map(|w| w.element_count()).sum();
        if values.len() != expected {
            return Err(Error::SizeMismatch { expected, actual: values.len() });
        }

        let mut offset = 0;
        for entry in &group.weights {
            let n = entry.element_count();
            tensors.insert(entry.name.clone(), (entry.shape.clone(), values[offset..offset + n].to_vec()));
            offset += n;
        }
    }
    Ok(tensors)
}

fn take_tensor(
    tensors: &mut HashMap<String, (Vec<usize>, Vec<f64>)>,
    name: &str,
    shape: &[usize],
) -> Result<Vec<f64>> {
    let (found, values) = tensors.remove(name)
        .ok_or_else(|| Error::Unsupported(format!("weight '{name}' missing from manifest")))?;
    if found != shape {
        return Err(Error::Unsupported(format!(
            "weight '{name}' has shape {found:?}, expected {shape:?}"
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkSpec;
    use crate::tfjs::export::{save_layers_model, save_layers_model_with_shard_size};
    use rand::{rngs::StdRng, SeedableRng};

    fn default_network() -> Network {
        Network::from_spec(&NetworkSpec::default(), &mut StdRng::seed_from_u64(42)).unwrap()
    }

    #[test]
    fn reloaded_model_predicts_the_same() {
        let tmp = tempfile::tempdir().unwrap();
        let original = default_network();
        save_layers_model_with_shard_size(&original, None, tmp.path(), 1000).unwrap();

        let loaded = load_layers_model(tmp.path()).unwrap();
        assert_eq!(loaded.name, "sequential");
        assert_eq!(loaded.input_size(), 4);
        assert_eq!(loaded.output_size(), 3);
        assert_eq!(loaded.layers.len(), 5);
        assert_eq!(loaded.layers[1].name(), "dropout");

        let x = [0.9, 0.1, 0.5, 0.3];
        for (a, b) in original.forward(&x).iter().zip(loaded.forward(&x)) {
            assert!((a - b).abs() < 1e-5, "{a} vs {b}");
        }
    }

    #[test]
    fn truncated_shard_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let saved = save_layers_model(&default_network(), None, tmp.path()).unwrap();
        let bytes = fs::read(&saved.shards[0]).unwrap();
        fs::write(&saved.shards[0], &bytes[..bytes.len() - 4]).unwrap();

        assert!(matches!(load_layers_model(tmp.path()), Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn unknown_activation_is_unsupported() {
        let tmp = tempfile::tempdir().unwrap();
        let saved = save_layers_model(&default_network(), None, tmp.path()).unwrap();
        let json = fs::read_to_string(&saved.model_json).unwrap();
        fs::write(&saved.model_json, json.replace("\"softmax\"", "\"gelu\"")).unwrap();

        assert!(matches!(load_layers_model(tmp.path()), Err(Error::Unsupported(_))));
    }

    #[test]
    fn accepts_an_explicit_input_layer() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("group1-shard1of1.bin"), crate::tfjs::weights::encode_f32_le(&[1.0, 2.0, 0.5])).unwrap();
        fs::write(tmp.path().join("model.json"), r#"{
            "format": "layers-model",
            "modelTopology": {
                "class_name": "Sequential",
                "config": {"name": "tiny", "layers": [
                    {"class_name": "InputLayer", "config": {"name": "in", "batch_input_shape": [null, 2]}},
                    {"class_name": "Dense", "config": {"name": "d", "units": 1, "activation": "linear"}}
                ]}
            },
            "weightsManifest": [{"paths": ["group1-shard1of1.bin"], "weights": [
                {"name": "d/kernel", "shape": [2, 1], "dtype": "float32"},
                {"name": "d/bias", "shape": [1], "dtype": "float32"}
            ]}]
        }"#).unwrap();

        let net = load_layers_model(tmp.path()).unwrap();
        assert_eq!(net.forward(&[1.0, 1.0]), vec![3.5]);
    }

    #[test]
    fn zero_unit_dense_layer_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("group1-shard1of1.bin"), [0u8; 0]).unwrap();
        fs::write(tmp.path().join("model.json"), r#"{
            "format": "layers-model",
            "modelTopology": {
                "class_name": "Sequential",
                "config": {"name": "hollow", "layers": [
                    {"class_name": "Dense", "config": {"name": "d", "units": 0, "activation": "softmax",
                     "batch_input_shape": [null, 2]}}
                ]}
            },
            "weightsManifest": [{"paths": ["group1-shard1of1.bin"], "weights": [
                {"name": "d/kernel", "shape": [2, 0], "dtype": "float32"},
                {"name": "d/bias", "shape": [0], "dtype": "float32"}
            ]}]
        }"#).unwrap();

        assert!(matches!(load_layers_model(tmp.path()), Err(Error::InvalidSpec(_))));
        assert!(crate::inference::Classifier::load(tmp.path()).is_err());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(load_layers_model(tmp.path().join("absent")), Err(Error::Io { .. })));
    }
}
