use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use tfjs_classifier::{pipeline, AppConfig, Classifier};

/// Trains a small dense classifier on synthetic data and exports it as a
/// TensorFlow.js layers model. With no arguments it runs `train` with the
/// stock settings and writes `./model`.
#[derive(Parser)]
#[command(name = "tfjs-classifier", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Train on synthetic data and export the model (the default).
    Train(TrainArgs),
    /// Classify one input vector with an exported model.
    Predict {
        /// Directory containing model.json.
        #[arg(long, default_value = "model")]
        model: PathBuf,
        /// Print the prediction as JSON.
        #[arg(long)]
        json: bool,
        /// Feature values, e.g. `0.1 0.5 0.9 0.3`.
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },
    /// Print the input and output shapes of an exported model.
    Info {
        #[arg(long, default_value = "model")]
        model: PathBuf,
    },
}

#[derive(Args, Default)]
struct TrainArgs {
    /// JSON config file; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for model.json and the weight shards.
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    epochs: Option<usize>,
    /// Seeds data generation, initialization, shuffling and dropout.
    #[arg(long)]
    seed: Option<u64>,
}

impl TrainArgs {
    fn into_config(self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_json(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AppConfig::default(),
        };
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(epochs) = self.epochs {
            config.train.epochs = epochs;
        }
        if let Some(seed) = self.seed {
            config.data.seed = seed;
            config.train.seed = seed;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command.unwrap_or_else(|| Command::Train(TrainArgs::default())) {
        Command::Train(args) => train(args.into_config()?),
        Command::Predict { model, json, values } => predict(model, json, &values),
        Command::Info { model } => {
            let classifier = Classifier::load(&model)
                .with_context(|| format!("loading model from {}", model.display()))?;
            println!("{}", classifier.info());
            Ok(())
        }
    }
}

fn train(config: AppConfig) -> anyhow::Result<()> {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("TensorFlow.js Model Training");
    println!("{rule}");

    let report = pipeline::run(&config).context("training run failed")?;

    println!("{rule}");
    println!("✓ Model saved successfully to {}", report.output_dir.display());
    match report.final_val_accuracy() {
        Some(acc) => println!("✓ Final validation accuracy: {acc:.4}"),
        None => println!("✓ No validation data; final training loss: {:.4}",
            report.history.last().map_or(f64::NAN, |s| s.loss)),
    }
    println!("{rule}");
    println!("Next steps:");
    println!("1. Copy the '{}' folder next to your web app", report.output_dir.display());
    println!("2. Load it with tf.loadLayersModel('model/model.json')");
    println!("{rule}");
    Ok(())
}

fn predict(model: PathBuf, json: bool, values: &[f64]) -> anyhow::Result<()> {
    let classifier = Classifier::load(&model)
        .with_context(|| format!("loading model from {}", model.display()))?;
    let prediction = classifier.predict(values)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("Predicted class: {}", prediction.predicted_class);
        println!("Confidence: {:.2}%", prediction.confidence * 100.0);
        for (class, p) in prediction.probabilities.iter().enumerate() {
            println!("  class {class}: {:.4}", p);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train_args(argv: &[&str]) -> TrainArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Command::Train(args)) => args,
            _ => panic!("expected the train subcommand"),
        }
    }

    #[test]
    fn no_arguments_trains_with_stock_settings() {
        let cli = Cli::try_parse_from(["tfjs-classifier"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(TrainArgs::default().into_config().unwrap(), AppConfig::default());
    }

    #[test]
    fn flags_override_the_defaults() {
        let config = train_args(&["tfjs-classifier", "train", "--output", "out", "--epochs", "3", "--seed", "7"])
            .into_config()
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.train.epochs, 3);
        assert_eq!(config.data.seed, 7);
        assert_eq!(config.train.seed, 7);
        assert_eq!(config.train.batch_size, 32);
    }

    #[test]
    fn flags_win_over_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"output_dir": "from_file", "train": {"epochs": 5, "seed": 1}}"#).unwrap();

        let path_arg = path.to_str().unwrap();
        let config = train_args(&["tfjs-classifier", "train", "--config", path_arg, "--epochs", "9"])
            .into_config()
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("from_file"));
        assert_eq!(config.train.epochs, 9);
        assert_eq!(config.train.seed, 1);
        assert_eq!(config.data.seed, 42);
    }

    #[test]
    fn predict_accepts_negative_values() {
        let cli = Cli::try_parse_from(["tfjs-classifier", "predict", "--model", "m", "0.5", "-1.25", "2", "0"]).unwrap();
        match cli.command {
            Some(Command::Predict { model, json, values }) => {
                assert_eq!(model, PathBuf::from("m"));
                assert!(!json);
                assert_eq!(values, vec![0.5, -1.25, 2.0, 0.0]);
            }
            _ => panic!("expected the predict subcommand"),
        }
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = train_args(&["tfjs-classifier", "train", "--config", "/no/such/run.json"])
            .into_config()
            .unwrap_err();
        assert!(err.to_string().contains("loading config"));
    }
}
