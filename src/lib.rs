pub mod activation;
pub mod config;
pub mod data;
pub mod error;
pub mod inference;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod optim;
pub mod pipeline;
pub mod tfjs;
pub mod train;

// Convenience re-exports
pub use activation::Activation;
pub use config::AppConfig;
pub use data::{synthetic_split, Dataset, SyntheticSpec};
pub use error::{Error, Result};
pub use inference::{Classifier, Prediction};
pub use loss::LossType;
pub use math::Matrix;
pub use network::{LayerSpec, Network, NetworkSpec};
pub use optim::{Adam, Optimizer, OptimizerConfig, Sgd};
pub use pipeline::{run, RunReport};
pub use tfjs::{load_layers_model, save_layers_model};
pub use train::{evaluate, train_loop, EpochStats, History, TrainConfig};
