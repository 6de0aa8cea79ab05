//! Serde model of the TensorFlow.js `model.json` file for a Keras
//! `Sequential` layers model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::loss::LossType;
use crate::optim::OptimizerConfig;

pub const LAYERS_MODEL_FORMAT: &str = "layers-model";
pub const KERAS_VERSION: &str = "2.15.0";
pub const FLOAT32: &str = "float32";

/// Top level of `model.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelJson {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub generated_by: Option<String>,
    #[serde(default)]
    pub converted_by: Option<String>,
    pub model_topology: ModelTopology,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_config: Option<KerasTrainingConfig>,
    pub weights_manifest: Vec<WeightGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTopology {
    pub class_name: String,
    pub config: SequentialConfig,
    #[serde(default)]
    pub keras_version: Option<String>,
    #[serde(default)]
    pub backend: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialConfig {
    pub name: String,
    pub layers: Vec<LayerConfig>,
}

/// One entry of the topology's layer list:
/// `{"class_name": "Dense", "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class_name", content = "config")]
pub enum LayerConfig {
    InputLayer(InputLayerConfig),
    Dense(DenseConfig),
    Dropout(DropoutConfig),
}

impl LayerConfig {
    /// `[null, n]` shape declared on the layer, if any.
    pub fn batch_input_shape(&self) -> Option<&[Option<usize>]> {
        match self {
            LayerConfig::InputLayer(c) => Some(c.batch_input_shape.as_slice()),
            LayerConfig::Dense(c) => c.batch_input_shape.as_deref(),
            LayerConfig::Dropout(c) => c.batch_input_shape.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputLayerConfig {
    pub name: String,
    pub batch_input_shape: Vec<Option<usize>>,
    #[serde(default = "float32")]
    pub dtype: String,
    #[serde(default)]
    pub sparse: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseConfig {
    pub name: String,
    #[serde(default = "yes")]
    pub trainable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_input_shape: Option<Vec<Option<usize>>>,
    #[serde(default = "float32")]
    pub dtype: String,
    pub units: usize,
    pub activation: String,
    #[serde(default = "yes")]
    pub use_bias: bool,
    #[serde(default)]
    pub kernel_initializer: Option<Initializer>,
    #[serde(default)]
    pub bias_initializer: Option<Initializer>,
    #[serde(default)]
    pub kernel_regularizer: Option<Value>,
    #[serde(default)]
    pub bias_regularizer: Option<Value>,
    #[serde(default)]
    pub activity_regularizer: Option<Value>,
    #[serde(default)]
    pub kernel_constraint: Option<Value>,
    #[serde(default)]
    pub bias_constraint: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropoutConfig {
    pub name: String,
    #[serde(default = "yes")]
    pub trainable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_input_shape: Option<Vec<Option<usize>>>,
    #[serde(default = "float32")]
    pub dtype: String,
    pub rate: f64,
    #[serde(default)]
    pub noise_shape: Option<Value>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// `{"class_name": "GlorotUniform", "config": {"seed": null}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    pub class_name: String,
    #[serde(default)]
    pub config: Value,
}

impl Initializer {
    pub fn glorot_uniform() -> Self {
        Initializer { class_name: "GlorotUniform".into(), config: serde_json::json!({ "seed": null }) }
    }

    pub fn zeros() -> Self {
        Initializer { class_name: "Zeros".into(), config: serde_json::json!({}) }
    }
}

/// How the model was compiled; browsers ignore it unless they keep training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KerasTrainingConfig {
    pub loss: LossType,
    pub metrics: Vec<String>,
    pub optimizer_config: OptimizerConfig,
}

impl KerasTrainingConfig {
    pub fn new(loss: LossType, optimizer_config: OptimizerConfig) -> Self {
        KerasTrainingConfig { loss, metrics: vec!["accuracy".into()], optimizer_config }
    }
}

/// One group of the weights manifest: the shard files and the tensors laid
/// out across them, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightGroup {
    pub paths: Vec<String>,
    pub weights: Vec<WeightEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
}

impl WeightEntry {
    pub fn float32(name: String, shape: Vec<usize>) -> Self {
        WeightEntry { name, shape, dtype: FLOAT32.into() }
    }

    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}

fn float32() -> String {
    FLOAT32.into()
}

fn yes() -> bool {
    true
}
