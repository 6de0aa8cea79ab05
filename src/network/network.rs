use rand::Rng;

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::layers::{Dense, DenseGradients, Dropout};
use crate::network::spec::{LayerSpec, NetworkSpec};

/// One layer of a sequential network.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(Dense),
    Dropout(Dropout),
}

impl Layer {
    pub fn name(&self) -> &str {
        match self {
            Layer::Dense(d) => &d.name,
            Layer::Dropout(d) => &d.name,
        }
    }

    /// Keras class name, as shown in summaries and written to `model.json`.
    pub fn class_name(&self) -> &'static str {
        match self {
            Layer::Dense(_) => "Dense",
            Layer::Dropout(_) => "Dropout",
        }
    }

    pub fn param_count(&self) -> usize {
        match self {
            Layer::Dense(d) => d.param_count(),
            Layer::Dropout(_) => 0,
        }
    }
}

/// Values recorded by a training-mode forward pass and consumed by
/// [`Network::backward`].
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    /// `inputs[i]` is what layer `i` was fed.
    inputs: Vec<Vec<f64>>,
    /// Pre-activation `z` for Dense layers, the sampled mask for Dropout.
    caches: Vec<Vec<f64>>,
    pub output: Vec<f64>,
}

/// Accumulated gradients, one entry per layer (`None` for parameterless layers).
#[derive(Debug, Clone)]
pub struct Gradients {
    pub layers: Vec<Option<DenseGradients>>,
}

/// A sequential stack of Dense and Dropout layers.
#[derive(Debug, Clone)]
pub struct Network {
    pub name: String,
    input_size: usize,
    pub layers: Vec<Layer>,
}

impl Network {
    /// Builds and initializes a network from a validated spec.
    pub fn from_spec<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;

        let mut width = spec.input_size;
        let layers = spec.layers.iter()
            .zip(spec.layer_names())
            .map(|(layer, name)| match *layer {
                LayerSpec::Dense { units, activation, .. } => {
                    let dense = Dense::new(name, width, units, activation, &mut *rng);
                    width = units;
                    Layer::Dense(dense)
                }
                LayerSpec::Dropout { rate, .. } => Layer::Dropout(Dropout::new(name, rate)),
            })
            .collect();

        log::debug!("initialized network '{}' from spec", spec.name);
        Ok(Network { name: spec.name.clone(), input_size: spec.input_size, layers })
    }

    /// Assembles a network from already-initialized layers, checking that
    /// widths are positive, consecutive Dense widths chain and the last
    /// layer is Dense.
    pub fn from_layers(name: impl Into<String>, input_size: usize, layers: Vec<Layer>) -> Result<Network> {
        if input_size == 0 {
            return Err(Error::InvalidSpec("input_size must be positive".into()));
        }
        let mut width = input_size;
        for layer in &layers {
            if let Layer::Dense(d) = layer {
                if d.units() == 0 {
                    return Err(Error::InvalidSpec(format!("layer '{}' has no units", d.name)));
                }
                if d.input_size() != width {
                    return Err(Error::InvalidSpec(format!(
                        "layer '{}' expects {} inputs but receives {width}",
                        d.name,
                        d.input_size()
                    )));
                }
                width = d.units();
            }
        }
        match layers.last() {
            Some(Layer::Dense(_)) => {}
            _ => return Err(Error::InvalidSpec("the output layer must be dense".into())),
        }
        Ok(Network { name: name.into(), input_size, layers })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers.iter()
            .rev()
            .find_map(|l| match l {
                Layer::Dense(d) => Some(d.units()),
                Layer::Dropout(_) => None,
            })
            .unwrap_or(self.input_size)
    }

    pub fn param_count(&self) -> usize {
        self.layers.iter().map(Layer::param_count).sum()
    }

    /// Activation of the last Dense layer.
    pub fn output_activation(&self) -> Activation {
        self.layers.iter()
            .rev()
            .find_map(|l| match l {
                Layer::Dense(d) => Some(d.activation),
                Layer::Dropout(_) => None,
            })
            .unwrap_or(Activation::Linear)
    }

    /// Inference-mode forward pass: dropout is the identity.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            if let Layer::Dense(d) = layer {
                current = d.feed_from(&current).1;
            }
        }
        current
    }

    /// Training-mode forward pass: samples dropout masks and records what the
    /// backward pass needs.
    pub fn forward_train<R: Rng + ?Sized>(&self, input: &[f64], rng: &mut R) -> ForwardTrace {
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut caches = Vec::with_capacity(self.layers.len());
        let mut current = input.to_vec();

        for layer in &self.layers {
            let (cache, next) = match layer {
                Layer::Dense(d) => d.feed_from(&current),
                Layer::Dropout(d) => {
                    let mask = d.sample_mask(current.len(), &mut *rng);
                    let out = Dropout::apply_mask(&current, &mask);
                    (mask, out)
                }
            };
            inputs.push(std::mem::replace(&mut current, next));
            caches.push(cache);
        }

        ForwardTrace { inputs, caches, output: current }
    }

    pub fn zero_gradients(&self) -> Gradients {
        Gradients {
            layers: self.layers.iter()
                .map(|l| match l {
                    Layer::Dense(d) => Some(DenseGradients::zeros_like(d)),
                    Layer::Dropout(_) => None,
                })
                .collect(),
        }
    }

    /// Backpropagates ∂L/∂output through the traced pass, accumulating into
    /// `grads`.
    pub fn backward(&self, trace: &ForwardTrace, output_delta: Vec<f64>, grads: &mut Gradients) {
        let mut delta = output_delta;
        for (i, layer) in self.layers.iter().enumerate().rev() {
            delta = match layer {
                Layer::Dense(d) => {
                    let g = grads.layers[i].get_or_insert_with(|| DenseGradients::zeros_like(d));
                    d.backward(&delta, &trace.caches[i], &trace.inputs[i], g)
                }
                Layer::Dropout(_) => Dropout::apply_mask(&delta, &trace.caches[i]),
            };
        }
    }

    /// Keras-style text summary of the layers, output shapes and parameter
    /// counts.
    pub fn summary(&self) -> String {
        const RULE: &str = "_________________________________________________________________";
        const DOUBLE: &str = "=================================================================";

        let mut out = String::new();
        out.push_str(&format!("Model: \"{}\"\n", self.name));
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!(" {:<28}{:<26}{}\n", "Layer (type)", "Output Shape", "Param #"));
        out.push_str(DOUBLE);
        out.push('\n');

        let mut width = self.input_size;
        for layer in &self.layers {
            if let Layer::Dense(d) = layer {
                width = d.units();
            }
            let label = format!("{} ({})", layer.name(), layer.class_name());
            let shape = format!("(None, {width})");
            out.push_str(&format!(" {label:<28}{shape:<26}{}\n", group_thousands(layer.param_count())));
        }

        let total = group_thousands(self.param_count());
        out.push_str(DOUBLE);
        out.push('\n');
        out.push_str(&format!("Total params: {total}\n"));
        out.push_str(&format!("Trainable params: {total}\n"));
        out.push_str("Non-trainable params: 0\n");
        out.push_str(RULE);
        out.push('\n');
        out
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::{one_hot, LossType};
    use crate::math::Matrix;
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn default_network() -> Network {
        let mut rng = StdRng::seed_from_u64(42);
        Network::from_spec(&NetworkSpec::default(), &mut rng).unwrap()
    }

    #[test]
    fn default_network_shapes() {
        let net = default_network();
        assert_eq!(net.input_size(), 4);
        assert_eq!(net.output_size(), 3);
        assert_eq!(net.param_count(), 4 * 64 + 64 + 64 * 32 + 32 + 32 * 3 + 3);

        let probs = net.forward(&[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(probs.len(), 3);
        assert_approx_eq!(probs.iter().sum::<f64>(), 1.0, 1e-9);
        assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn summary_lists_layers_and_totals() {
        let summary = default_network().summary();
        assert!(summary.contains("Model: \"sequential\""));
        assert!(summary.contains("dense_1 (Dense)"));
        assert!(summary.contains("dropout_1 (Dropout)"));
        assert!(summary.contains("(None, 64)"));
        assert!(summary.contains("Total params: 2,499"));
    }

    #[test]
    fn group_thousands_inserts_commas() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn from_layers_checks_widths() {
        let dense = |name: &str, i, o| Layer::Dense(Dense {
            name: name.into(),
            weights: Matrix::zeros(i, o),
            biases: vec![0.0; o],
            activation: Activation::Linear,
        });

        assert!(Network::from_layers("ok", 2, vec![dense("a", 2, 3), dense("b", 3, 1)]).is_ok());
        assert!(Network::from_layers("bad", 2, vec![dense("a", 2, 3), dense("b", 2, 1)]).is_err());
        assert!(Network::from_layers(
            "tail", 2,
            vec![dense("a", 2, 3), Layer::Dropout(Dropout::new("d", 0.1))]
        ).is_err());
    }

    #[test]
    fn from_layers_rejects_zero_widths() {
        let dense = |i, o| Layer::Dense(Dense {
            name: "d".into(),
            weights: Matrix::zeros(i, o),
            biases: vec![0.0; o],
            activation: Activation::Linear,
        });

        assert!(matches!(Network::from_layers("empty_out", 2, vec![dense(2, 0)]), Err(Error::InvalidSpec(_))));
        assert!(matches!(Network::from_layers("empty_in", 0, vec![dense(0, 1)]), Err(Error::InvalidSpec(_))));
    }

    #[test]
    fn output_bias_gradient_matches_finite_differences_for_each_loss() {
        let net = default_network();
        let input = [0.3, 0.9, 0.1, 0.6];
        let expected = one_hot(2, 3);
        let out = net.layers.len() - 1;
        assert_eq!(net.output_activation(), Activation::Softmax);

        for loss in [LossType::SparseCategoricalCrossentropy, LossType::MeanSquaredError] {
            let trace = net.forward_train(&input, &mut StdRng::seed_from_u64(8));
            let mut grads = net.zero_gradients();
            let delta = loss.output_delta(&trace.output, &expected, net.output_activation());
            net.backward(&trace, delta, &mut grads);
            let analytic = &grads.layers[out].as_ref().unwrap().biases;

            let objective = |n: &Network| {
                let output = n.forward_train(&input, &mut StdRng::seed_from_u64(8)).output;
                loss.loss(&output, &expected)
            };
            let h = 1e-6;
            for k in 0..3 {
                let mut plus = net.clone();
                let mut minus = net.clone();
                if let (Layer::Dense(p), Layer::Dense(m)) = (&mut plus.layers[out], &mut minus.layers[out]) {
                    p.biases[k] += h;
                    m.biases[k] -= h;
                }
                let numeric = (objective(&plus) - objective(&minus)) / (2.0 * h);
                assert_approx_eq!(analytic[k], numeric, 1e-6);
            }
        }
    }

    #[test]
    fn backward_matches_finite_differences_through_dropout() {
        let mut rng = StdRng::seed_from_u64(5);
        let spec = NetworkSpec {
            name: "tiny".into(),
            input_size: 3,
            layers: vec![
                LayerSpec::dense(4, Activation::Tanh),
                LayerSpec::dropout(0.5),
                LayerSpec::dense(2, Activation::Linear),
            ],
        };
        let net = Network::from_spec(&spec, &mut rng).unwrap();
        let input = [0.2, -0.4, 0.9];

        let trace = net.forward_train(&input, &mut StdRng::seed_from_u64(11));
        let mut grads = net.zero_gradients();
        // L = sum(output)
        net.backward(&trace, vec![1.0; 2], &mut grads);

        // Re-running with the same dropout seed reproduces the same mask.
        let loss = |n: &Network| n.forward_train(&input, &mut StdRng::seed_from_u64(11)).output.iter().sum::<f64>();
        let h = 1e-6;
        let g = grads.layers[0].as_ref().unwrap();
        for k in 0..12 {
            let mut plus = net.clone();
            let mut minus = net.clone();
            if let (Layer::Dense(p), Layer::Dense(m)) = (&mut plus.layers[0], &mut minus.layers[0]) {
                p.weights.as_mut_slice()[k] += h;
                m.weights.as_mut_slice()[k] -= h;
            }
            let numeric = (loss(&plus) - loss(&minus)) / (2.0 * h);
            assert_approx_eq!(g.weights.as_slice()[k], numeric, 1e-6);
        }
        assert!(grads.layers[1].is_none());
    }
}
