use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::SyntheticSpec;
use crate::error::{Error, Result};
use crate::network::{LayerSpec, NetworkSpec};
use crate::optim::OptimizerConfig;
use crate::train::TrainConfig;

/// Everything a training run needs. `Default` reproduces the stock run:
/// the 4 → 64 → 32 → 3 network, Adam at 0.001, 20 epochs of batch 32 on
/// 500/100 seeded samples, exported to `./model`.
///
/// Every field is optional in JSON; missing ones take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub data: SyntheticSpec,
    pub network: NetworkSpec,
    pub optimizer: OptimizerConfig,
    pub train: TrainConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            output_dir: PathBuf::from("model"),
            data: SyntheticSpec::default(),
            network: NetworkSpec::default(),
            optimizer: OptimizerConfig::default(),
            train: TrainConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads a config from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Checks that the data and network agree on input and output widths.
    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        if self.data.features != self.network.input_size {
            return Err(Error::InvalidSpec(format!(
                "data has {} features but the network takes {}",
                self.data.features, self.network.input_size
            )));
        }
        let outputs = self.network.layers.iter().rev().find_map(|l| match l {
            LayerSpec::Dense { units, .. } => Some(*units),
            LayerSpec::Dropout { .. } => None,
        });
        if outputs != Some(self.data.classes) {
            return Err(Error::InvalidSpec(format!(
                "data has {} classes but the network outputs {:?}",
                self.data.classes, outputs
            )));
        }
        Ok(())
    }
}
