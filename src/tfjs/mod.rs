//! TensorFlow.js layers-model conversion: `model.json` plus binary weight
//! shards, loadable in the browser with `tf.loadLayersModel`.

pub mod export;
pub mod import;
pub mod topology;
pub mod weights;

pub use export::{save_layers_model, save_layers_model_with_shard_size, SavedModel, MODEL_JSON};
pub use import::{load_layers_model, read_model_json};
pub use topology::{KerasTrainingConfig, ModelJson};
