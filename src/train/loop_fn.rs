use std::time::Instant;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::loss::{one_hot, LossType};
use crate::network::{Layer, Network};
use crate::optim::Optimizer;
use crate::train::epoch_stats::{EpochStats, History};
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains `network` in place for `config.epochs` epochs of shuffled
/// mini-batch updates and returns the per-epoch history.
///
/// Gradients are averaged over each mini-batch and every Dense kernel and
/// bias gets one optimizer update per batch. Training loss and accuracy come
/// from the training-mode passes of the epoch (dropout active); validation
/// metrics are computed afterwards in inference mode.
///
/// # Errors
/// `InvalidDataset` if the training set is empty or either dataset does not
/// fit the network's input/output widths; `InvalidSpec` if `batch_size == 0`.
pub fn train_loop(
    network: &mut Network,
    train: &Dataset,
    val: Option<&Dataset>,
    optimizer: &mut dyn Optimizer,
    config: &TrainConfig,
) -> Result<History> {
    if train.is_empty() {
        return Err(Error::InvalidDataset("training set is empty".into()));
    }
    if config.batch_size == 0 {
        return Err(Error::InvalidSpec("batch_size must be at least 1".into()));
    }
    check_fits(network, train, "training")?;
    if let Some(v) = val {
        check_fits(network, v, "validation")?;
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut history = History::default();

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let (loss, accuracy) = run_one_epoch(network, train, optimizer, config, &mut rng)?;

        let (val_loss, val_accuracy) = match val {
            Some(v) if !v.is_empty() => {
                let (l, a) = evaluate(network, v, config.loss);
                (Some(l), Some(a))
            }
            _ => (None, None),
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            loss,
            accuracy,
            val_loss,
            val_accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        log::info!("{}", format_epoch(&stats));
        history.epochs.push(stats);
    }

    Ok(history)
}

/// Mean loss and accuracy of `network` over `dataset` in inference mode.
/// Returns `(0.0, 0.0)` for an empty dataset.
pub fn evaluate(network: &Network, dataset: &Dataset, loss: LossType) -> (f64, f64) {
    let n = dataset.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let classes = dataset.num_classes();
    let (total, correct) = dataset.inputs().iter().zip(dataset.labels())
        .fold((0.0, 0usize), |(total, correct), (input, &label)| {
            let output = network.forward(input);
            let hit = usize::from(argmax(&output) == label);
            (total + loss.loss(&output, &one_hot(label, classes)), correct + hit)
        });
    (total / n as f64, correct as f64 / n as f64)
}

/// Index of the largest element; the first one wins on ties.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best), (i, &x)| {
            if x > best { (i, x) } else { (best_i, best) }
        })
        .0
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn check_fits(network: &Network, dataset: &Dataset, which: &str) -> Result<()> {
    if !dataset.is_empty() && dataset.feature_width() != network.input_size() {
        return Err(Error::InvalidDataset(format!(
            "{which} rows have {} features but the network expects {}",
            dataset.feature_width(),
            network.input_size()
        )));
    }
    if dataset.num_classes() != network.output_size() {
        return Err(Error::InvalidDataset(format!(
            "{which} set has {} classes but the network outputs {}",
            dataset.num_classes(),
            network.output_size()
        )));
    }
    Ok(())
}

/// One full pass over the training data. Returns `(mean loss, accuracy)`.
fn run_one_epoch(
    network: &mut Network,
    train: &Dataset,
    optimizer: &mut dyn Optimizer,
    config: &TrainConfig,
    rng: &mut StdRng,
) -> Result<(f64, f64)> {
    let n = train.len();
    let classes = train.num_classes();
    let output = network.output_activation();
    let mut total_loss = 0.0;
    let mut correct = 0usize;

    // Shuffle sample order each epoch.
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    for batch in indices.chunks(config.batch_size) {
        let mut grads = network.zero_gradients();

        for &idx in batch {
            let input = &train.inputs()[idx];
            let label = train.labels()[idx];
            let expected = one_hot(label, classes);

            let trace = network.forward_train(input, rng);
            total_loss += config.loss.loss(&trace.output, &expected);
            if argmax(&trace.output) == label {
                correct += 1;
            }

            let error = config.loss.output_delta(&trace.output, &expected, output);
            network.backward(&trace, error, &mut grads);
        }

        // Average and apply.
        let inv_batch = 1.0 / batch.len() as f64;
        for (i, (layer, grad)) in network.layers.iter_mut().zip(grads.layers).enumerate() {
            let (Layer::Dense(dense), Some(grad)) = (layer, grad) else {
                continue;
            };
            let w_avg: Vec<f64> = grad.weights.as_slice().iter().map(|g| g * inv_batch).collect();
            let b_avg: Vec<f64> = grad.biases.iter().map(|g| g * inv_batch).collect();
            optimizer.update_params(2 * i, dense.weights.as_mut_slice(), &w_avg)?;
            optimizer.update_params(2 * i + 1, &mut dense.biases, &b_avg)?;
        }
    }

    Ok((total_loss / n as f64, correct as f64 / n as f64))
}

/// Keras-style one-line progress report.
fn format_epoch(stats: &EpochStats) -> String {
    let mut line = format!(
        "epoch {}/{} - {}ms - loss: {:.4} - accuracy: {:.4}",
        stats.epoch, stats.total_epochs, stats.elapsed_ms, stats.loss, stats.accuracy
    );
    if let (Some(l), Some(a)) = (stats.val_loss, stats.val_accuracy) {
        line.push_str(&format!(" - val_loss: {l:.4} - val_accuracy: {a:.4}"));
    }
    line
}
