//! Multilayer perceptron regressor.
//!
//! Two ReLU hidden layers and a linear output unit, trained with minibatch
//! Adam on half squared error plus an L2 penalty. Training stops after
//! `max_iter` epochs or once the epoch loss has failed to improve by `tolerance`
//! for `n_iter_no_change` consecutive epochs.
//!
//! Parameters live in one flat vector, layer by layer: the weight matrix
//! (`n_out × n_in`, row-major) followed by the bias vector.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::adam::AdamOptimizer;
use super::{check_predict_input, check_training_data, Regressor};
use crate::error::{DriftError, DriftResult};
use crate::features::FeatureVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpConfig {
    /// Units in the first and second hidden layer
    pub hidden_layers: [usize; 2],
    pub learning_rate: f64,
    /// L2 penalty on weights
    pub alpha: f64,
    /// Capped at the number of training rows
    pub batch_size: usize,
    /// Maximum number of epochs
    pub max_iter: usize,
    pub tolerance: f64,
    pub n_iter_no_change: usize,
    pub seed: u64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: [100, 50],
            learning_rate: 0.001,
            alpha: 1e-4,
            batch_size: 200,
            max_iter: 1000,
            tolerance: 1e-4,
            n_iter_no_change: 10,
            seed: 42,
        }
    }
}

/// Offsets of one dense layer inside the flat parameter vector.
#[derive(Debug, Clone, Copy)]
struct LayerSpan {
    n_in: usize,
    n_out: usize,
    weights: usize,
    biases: usize,
}

fn layer_spans(sizes: &[usize]) -> Vec<LayerSpan> {
    let mut offset = 0;
    sizes
        .windows(2)
        .map(|w| {
            let (n_in, n_out) = (w[0], w[1]);
            let span = LayerSpan {
                n_in,
                n_out,
                weights: offset,
                biases: offset + n_in * n_out,
            };
            offset += n_in * n_out + n_out;
            span
        })
        .collect()
}

/// Activations of every layer for one sample; `acts[0]` is the input.
fn forward(params: &[f64], spans: &[LayerSpan], x: &[f64], acts: &mut Vec<Vec<f64>>) -> f64 {
    acts.clear();
    acts.push(x.to_vec());
    let last = spans.len() - 1;

    for (l, span) in spans.iter().enumerate() {
        let input = &acts[l];
        let mut out = Vec::with_capacity(span.n_out);
        for o in 0..span.n_out {
            let row = &params[span.weights + o * span.n_in..span.weights + (o + 1) * span.n_in];
            let z = params[span.biases + o]
                + row.iter().zip(input).map(|(w, a)| w * a).sum::<f64>();
            out.push(if l == last { z } else { z.max(0.0) });
        }
        acts.push(out);
    }

    acts[spans.len()][0]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedMlp {
    sizes: Vec<usize>,
    params: Vec<f64>,
    epochs: usize,
    final_loss: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNetwork {
    config: MlpConfig,
    fitted: Option<FittedMlp>,
}

impl NeuralNetwork {
    pub fn new(config: MlpConfig) -> Self {
        Self { config, fitted: None }
    }

    /// Epochs run by the last fit.
    pub fn epochs(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.epochs)
    }

    /// Training loss after the last epoch.
    pub fn final_loss(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.final_loss)
    }

    fn validate_config(&self) -> DriftResult<()> {
        let cfg = &self.config;
        let mut problems = Vec::new();
        if cfg.hidden_layers.iter().any(|&h| h == 0) {
            problems.push("hidden layers must have at least one unit".to_string());
        }
        if !(cfg.learning_rate > 0.0) {
            problems.push(format!("learning_rate must be > 0, got {}", cfg.learning_rate));
        }
        if !(cfg.alpha >= 0.0) {
            problems.push(format!("alpha must be >= 0, got {}", cfg.alpha));
        }
        if cfg.batch_size == 0 || cfg.max_iter == 0 {
            problems.push("batch_size and max_iter must be positive".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(DriftError::InvalidInput(problems.join("; ")))
        }
    }
}

/// Glorot-uniform initialization for ReLU layers, biases included.
fn init_params(spans: &[LayerSpan], total: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut params = vec![0.0; total];
    for span in spans {
        let bound = (6.0 / (span.n_in + span.n_out) as f64).sqrt();
        let end = span.biases + span.n_out;
        for p in &mut params[span.weights..end] {
            *p = rng.gen_range(-bound..bound);
        }
    }
    params
}

impl Regressor for NeuralNetwork {
    fn name(&self) -> &'static str {
        "neural_network"
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[f64]) -> DriftResult<()> {
        let n_features = check_training_data(features, labels)?;
        self.validate_config()?;
        let cfg = &self.config;

        let sizes = vec![n_features, cfg.hidden_layers[0], cfg.hidden_layers[1], 1];
        let spans = layer_spans(&sizes);
        let total = spans
            .last()
            .map_or(0, |s| s.biases + s.n_out);

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut params = init_params(&spans, total, &mut rng);
        let mut adam = AdamOptimizer::new(total, cfg.learning_rate);

        let n = features.len();
        let batch_size = cfg.batch_size.min(n);
        let mut order: Vec<usize> = (0..n).collect();
        let mut grads = vec![0.0; total];
        let mut acts: Vec<Vec<f64>> = Vec::with_capacity(sizes.len());

        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;
        let mut epochs = 0;
        let mut epoch_loss = f64::INFINITY;

        while epochs < cfg.max_iter {
            epochs += 1;
            order.shuffle(&mut rng);
            let mut loss_sum = 0.0;

            for batch in order.chunks(batch_size) {
                let m = batch.len() as f64;
                grads.iter_mut().for_each(|g| *g = 0.0);
                let mut sq_err = 0.0;

                for &row in batch {
                    let pred = forward(&params, &spans, features[row].as_slice(), &mut acts);
                    let err = pred - labels[row];
                    sq_err += err * err;

                    let mut delta = vec![err / m];
                    for (l, span) in spans.iter().enumerate().rev() {
                        let input = &acts[l];
                        for (o, d) in delta.iter().enumerate() {
                            grads[span.biases + o] += d;
                            let w0 = span.weights + o * span.n_in;
                            for (g, a) in grads[w0..w0 + span.n_in].iter_mut().zip(input) {
                                *g += d * a;
                            }
                        }
                        if l == 0 {
                            break;
                        }

                        let mut prev = vec![0.0; span.n_in];
                        for (o, d) in delta.iter().enumerate() {
                            let w0 = span.weights + o * span.n_in;
                            for (p, w) in prev.iter_mut().zip(&params[w0..w0 + span.n_in]) {
                                *p += w * d;
                            }
                        }
                        for (p, a) in prev.iter_mut().zip(input) {
                            if *a <= 0.0 {
                                *p = 0.0;
                            }
                        }
                        delta = prev;
                    }
                }

                let mut weight_sq = 0.0;
                for span in &spans {
                    let w_range = span.weights..span.biases;
                    for (g, w) in grads[w_range.clone()].iter_mut().zip(&params[w_range]) {
                        *g += cfg.alpha * w / m;
                        weight_sq += w * w;
                    }
                }

                let batch_loss = sq_err / (2.0 * m) + cfg.alpha * weight_sq / (2.0 * m);
                if !batch_loss.is_finite() {
                    return Err(DriftError::Numerical(format!(
                        "neural network loss diverged in epoch {epochs}"
                    )));
                }
                loss_sum += batch_loss * m;
                adam.apply(&mut params, &grads);
            }

            epoch_loss = loss_sum / n as f64;
            if epoch_loss > best_loss - cfg.tolerance {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            best_loss = best_loss.min(epoch_loss);

            if no_improvement > cfg.n_iter_no_change {
                break;
            }
        }

        if epochs == cfg.max_iter && no_improvement <= cfg.n_iter_no_change {
            warn!(epochs, loss = epoch_loss, "Neural network reached max_iter before converging");
        }
        debug!(rows = n, params = total, epochs, loss = epoch_loss, "Neural network fitted");

        self.fitted = Some(FittedMlp {
            sizes,
            params,
            epochs,
            final_loss: epoch_loss,
        });
        Ok(())
    }

    fn predict(&self, features: &[FeatureVector]) -> DriftResult<Vec<f64>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(DriftError::NotTrained("neural network has not been fitted"))?;
        check_predict_input(features, fitted.sizes[0])?;

        let spans = layer_spans(&fitted.sizes);
        let mut acts = Vec::with_capacity(fitted.sizes.len());
        Ok(features
            .iter()
            .map(|x| forward(&fitted.params, &spans, x.as_slice(), &mut acts))
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}
