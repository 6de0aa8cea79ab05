use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::network::{Layer, Network};
use crate::tfjs::topology::{
    DenseConfig, DropoutConfig, Initializer, KerasTrainingConfig, LayerConfig, ModelJson,
    ModelTopology, SequentialConfig, WeightEntry, WeightGroup, FLOAT32, KERAS_VERSION,
    LAYERS_MODEL_FORMAT,
};
use crate::tfjs::weights::{encode_f32_le, remove_stale_shards, write_shards, SHARD_SIZE_BYTES};

pub const MODEL_JSON: &str = "model.json";

/// What `save_layers_model` wrote.
#[derive(Debug, Clone)]
pub struct SavedModel {
    pub model_json: PathBuf,
    pub shards: Vec<PathBuf>,
    pub weight_bytes: usize,
}

/// Converts `network` to the TensorFlow.js layers-model format in `dir`,
/// creating the directory if needed. Existing files are overwritten and
/// weight shards left over from an earlier export are removed.
pub fn save_layers_model(
    network: &Network,
    training: Option<&KerasTrainingConfig>,
    dir: impl AsRef<Path>,
) -> Result<SavedModel> {
    save_layers_model_with_shard_size(network, training, dir, SHARD_SIZE_BYTES)
}

/// As [`save_layers_model`], with an explicit maximum shard size in bytes.
pub fn save_layers_model_with_shard_size(
    network: &Network,
    training: Option<&KerasTrainingConfig>,
    dir: impl AsRef<Path>,
    max_shard_bytes: usize,
) -> Result<SavedModel> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let (entries, values) = collect_weights(network);
    let bytes = encode_f32_le(&values);
    let paths = write_shards(dir, &bytes, max_shard_bytes)?;
    remove_stale_shards(dir, &paths)?;

    let model = ModelJson {
        format: Some(LAYERS_MODEL_FORMAT.into()),
        generated_by: Some(format!("keras v{KERAS_VERSION}")),
        converted_by: Some(format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))),
        model_topology: topology(network),
        training_config: training.cloned(),
        weights_manifest: vec![WeightGroup { paths: paths.clone(), weights: entries }],
    };

    let model_json = dir.join(MODEL_JSON);
    let file = fs::File::create(&model_json).map_err(|e| Error::io(&model_json, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &model)?;
    writer.flush().map_err(|e| Error::io(&model_json, e))?;

    log::info!(
        "saved {} ({} weight bytes in {} shard(s))",
        model_json.display(),
        bytes.len(),
        paths.len()
    );
    Ok(SavedModel {
        model_json,
        shards: paths.iter().map(|p| dir.join(p)).collect(),
        weight_bytes: bytes.len(),
    })
}

/// Builds the `Sequential` topology. The first layer carries the
/// `batch_input_shape` so the browser runtime knows the input width.
pub fn topology(network: &Network) -> ModelTopology {
    let layers = network.layers.iter()
        .enumerate()
        .map(|(i, layer)| {
            let batch_input_shape = (i == 0).then(|| vec![None, Some(network.input_size())]);
            match layer {
                Layer::Dense(d) => LayerConfig::Dense(DenseConfig {
                    name: d.name.clone(),
                    trainable: true,
                    batch_input_shape,
                    dtype: FLOAT32.into(),
                    units: d.units(),
                    activation: d.activation.keras_name().into(),
                    use_bias: true,
                    kernel_initializer: Some(Initializer::glorot_uniform()),
                    bias_initializer: Some(Initializer::zeros()),
                    kernel_regularizer: None,
                    bias_regularizer: None,
                    activity_regularizer: None,
                    kernel_constraint: None,
                    bias_constraint: None,
                }),
                Layer::Dropout(d) => LayerConfig::Dropout(DropoutConfig {
                    name: d.name.clone(),
                    trainable: true,
                    batch_input_shape,
                    dtype: FLOAT32.into(),
                    rate: d.rate,
                    noise_shape: None,
                    seed: None,
                }),
            }
        })
        .collect();

    ModelTopology {
        class_name: "Sequential".into(),
        config: SequentialConfig { name: network.name.clone(), layers },
        keras_version: Some(KERAS_VERSION.into()),
        backend: Some("tensorflow".into()),
    }
}

/// Manifest entries and the flat values they describe: for each Dense layer
/// its `kernel` (`[in, units]`, row-major) then its `bias` (`[units]`).
fn collect_weights(network: &Network) -> (Vec<WeightEntry>, Vec<f64>) {
    let mut entries = Vec::new();
    let mut values = Vec::with_capacity(network.param_count());
    for layer in &network.layers {
        if let Layer::Dense(d) = layer {
            entries.push(WeightEntry::float32(
                format!("{}/kernel", d.name),
                vec![d.input_size(), d.units()],
            ));
            values.extend_from_slice(d.weights.as_slice());
            entries.push(WeightEntry::float32(format!("{}/bias", d.name), vec![d.units()]));
            values.extend_from_slice(&d.biases);
        }
    }
    (entries, values)
}
