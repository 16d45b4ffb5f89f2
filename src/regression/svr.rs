//! Epsilon-insensitive support vector regression with an RBF kernel.
//!
//! Solved in the dual by cyclic coordinate descent:
//!
//! ```text
//! min_β  ½ βᵀQβ − yᵀβ + ε·Σ|βᵢ|      subject to  −C ≤ βᵢ ≤ C
//! Q = K + 1   (constant term absorbs the bias)
//! f(x) = Σ βᵢ (k(xᵢ, x) + 1)
//! ```
//!
//! Each coordinate step is a closed-form soft-threshold followed by a clamp
//! to the box. Rows with `βᵢ = 0` are dropped after fitting.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{check_predict_input, check_training_data, Regressor};
use crate::error::{DriftError, DriftResult};
use crate::features::FeatureVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvrConfig {
    /// Box constraint on the dual coefficients
    pub c: f64,
    /// Width of the insensitive tube (degrees)
    pub epsilon: f64,
    /// RBF width; `None` uses `1 / (n_features * var(X))`
    pub gamma: Option<f64>,
    /// Stop when no coefficient moves more than this in a full pass
    pub tolerance: f64,
    pub max_passes: usize,
}

impl Default for SvrConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.1,
            gamma: None,
            tolerance: 1e-3,
            max_passes: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedSvr {
    gamma: f64,
    support_vectors: Vec<FeatureVector>,
    dual_coef: Vec<f64>,
    n_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelSvr {
    config: SvrConfig,
    fitted: Option<FittedSvr>,
}

fn rbf(a: &[f64], b: &[f64], gamma: f64) -> f64 {
    let dist_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (-gamma * dist_sq).exp()
}

/// `1 / (n_features * var(X))` over every entry of the design matrix.
fn scale_gamma(features: &[FeatureVector], n_features: usize) -> f64 {
    let count = (features.len() * n_features) as f64;
    let mean: f64 = features.iter().flat_map(|f| f.as_slice()).sum::<f64>() / count;
    let var: f64 = features
        .iter()
        .flat_map(|f| f.as_slice())
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / count;
    if var > 0.0 {
        1.0 / (n_features as f64 * var)
    } else {
        1.0
    }
}

impl KernelSvr {
    pub fn new(config: SvrConfig) -> Self {
        Self { config, fitted: None }
    }

    /// Number of retained support vectors (0 before fitting).
    pub fn support_vector_count(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.support_vectors.len())
    }
}

impl Regressor for KernelSvr {
    fn name(&self) -> &'static str {
        "kernel_svr"
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[f64]) -> DriftResult<()> {
        let n_features = check_training_data(features, labels)?;
        let cfg = &self.config;
        if !(cfg.c > 0.0) || !(cfg.epsilon >= 0.0) {
            return Err(DriftError::InvalidInput(format!(
                "SVR requires c > 0 and epsilon >= 0 (c={}, epsilon={})",
                cfg.c, cfg.epsilon
            )));
        }

        let gamma = match cfg.gamma {
            Some(g) if g > 0.0 => g,
            Some(g) => {
                return Err(DriftError::InvalidInput(format!("SVR gamma must be > 0, got {g}")));
            }
            None => scale_gamma(features, n_features),
        };

        let n = features.len();
        let mut q = vec![0.0; n * n];
        q.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            let xi = features[i].as_slice();
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = rbf(xi, features[j].as_slice(), gamma) + 1.0;
            }
        });

        let mut beta = vec![0.0; n];
        let mut grad = vec![0.0; n];
        let mut converged = false;
        let mut passes = 0;

        while passes < cfg.max_passes {
            passes += 1;
            let mut max_step: f64 = 0.0;

            for i in 0..n {
                let q_ii = q[i * n + i];
                let u = beta[i] + (labels[i] - grad[i]) / q_ii;
                let shrunk = u.signum() * (u.abs() - cfg.epsilon / q_ii).max(0.0);
                let updated = shrunk.clamp(-cfg.c, cfg.c);
                let step = updated - beta[i];
                if step == 0.0 {
                    continue;
                }

                beta[i] = updated;
                let row = &q[i * n..(i + 1) * n];
                for (g, q_ij) in grad.iter_mut().zip(row) {
                    *g += step * q_ij;
                }
                max_step = max_step.max(step.abs());
            }

            if !max_step.is_finite() {
                return Err(DriftError::Numerical(
                    "SVR dual coordinate descent produced non-finite coefficients".to_string(),
                ));
            }
            if max_step < cfg.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(passes, "SVR reached pass limit before converging");
        }

        let (support_vectors, dual_coef): (Vec<FeatureVector>, Vec<f64>) = features
            .iter()
            .zip(&beta)
            .filter(|(_, b)| **b != 0.0)
            .map(|(f, b)| (f.clone(), *b))
            .unzip();

        debug!(
            rows = n,
            support_vectors = support_vectors.len(),
            gamma,
            passes,
            "SVR fitted"
        );

        self.fitted = Some(FittedSvr {
            gamma,
            support_vectors,
            dual_coef,
            n_features,
        });
        Ok(())
    }

    fn predict(&self, features: &[FeatureVector]) -> DriftResult<Vec<f64>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(DriftError::NotTrained("kernel SVR has not been fitted"))?;
        check_predict_input(features, fitted.n_features)?;

        Ok(features
            .par_iter()
            .map(|x| {
                fitted
                    .support_vectors
                    .iter()
                    .zip(&fitted.dual_coef)
                    .map(|(sv, b)| b * (rbf(sv.as_slice(), x.as_slice(), fitted.gamma) + 1.0))
                    .sum::<f64>()
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}
