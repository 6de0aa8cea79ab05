use std::path::PathBuf;

use log::info;
use rand::{rngs::StdRng, SeedableRng};

use crate::config::AppConfig;
use crate::data::synthetic_split;
use crate::error::Result;
use crate::network::Network;
use crate::tfjs::{save_layers_model, KerasTrainingConfig, SavedModel};
use crate::train::{train_loop, History};

/// Outcome of a full [`run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub saved: SavedModel,
    pub summary: String,
    pub train_samples: usize,
    pub val_samples: usize,
    pub history: History,
}

impl RunReport {
    pub fn final_val_accuracy(&self) -> Option<f64> {
        self.history.final_val_accuracy()
    }
}

/// Builds the network, generates the data, trains, and exports the result to
/// `config.output_dir`.
pub fn run(config: &AppConfig) -> Result<RunReport> {
    config.validate()?;

    info!("[1/5] Creating model...");
    let mut init_rng = StdRng::seed_from_u64(config.train.seed);
    let mut network = Network::from_spec(&config.network, &mut init_rng)?;
    let mut optimizer = config.optimizer.build();

    let summary = network.summary();
    info!("[2/5] Model summary:\n{summary}");

    info!("[3/5] Generating training data...");
    let (train, val) = synthetic_split(&config.data)?;
    info!("training samples: {}", train.len());
    info!("validation samples: {}", val.len());

    info!("[4/5] Training model...");
    let history = train_loop(&mut network, &train, Some(&val), optimizer.as_mut(), &config.train)?;

    info!("[5/5] Saving model to {}...", config.output_dir.display());
    let training = KerasTrainingConfig::new(config.train.loss, config.optimizer.clone());
    let saved = save_layers_model(&network, Some(&training), &config.output_dir)?;

    Ok(RunReport {
        output_dir: config.output_dir.clone(),
        saved,
        summary,
        train_samples: train.len(),
        val_samples: val.len(),
        history,
    })
}
