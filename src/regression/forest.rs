//! Random forest regressor.
//!
//! Each tree is grown on a bootstrap resample with a random feature subset
//! per split. Trees are independent and fitted in parallel with rayon; tree
//! `t` draws from its own RNG seeded with `seed + t`, so the fitted forest
//! does not depend on thread scheduling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tree::{RegressionTree, TreeParams};
use super::{check_predict_input, check_training_data, Regressor};
use crate::error::{DriftError, DriftResult};
use crate::features::FeatureVector;

/// Number of features examined per split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    #[default]
    All,
    Sqrt,
    Third,
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Third => n_features / 3,
        };
        k.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Unlimited when absent
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    fitted: Option<FittedForest>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self { config, fitted: None }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    fn fitted(&self) -> DriftResult<&FittedForest> {
        self.fitted
            .as_ref()
            .ok_or(DriftError::NotTrained("random forest has not been fitted"))
    }
}

impl Regressor for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[f64]) -> DriftResult<()> {
        let n_features = check_training_data(features, labels)?;
        if self.config.n_trees == 0 {
            return Err(DriftError::InvalidInput("forest needs at least one tree".to_string()));
        }

        let n_rows = features.len();
        let params = TreeParams {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split.max(2),
            min_samples_leaf: self.config.min_samples_leaf.max(1),
            max_features: self.config.max_features.resolve(n_features),
        };
        let seed = self.config.seed;

        let trees: Vec<RegressionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let bootstrap: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
                RegressionTree::fit(features, labels, bootstrap, n_features, params, &mut rng)
            })
            .collect();

        debug!(
            trees = trees.len(),
            rows = n_rows,
            features = n_features,
            max_features = params.max_features,
            "Random forest fitted"
        );

        self.fitted = Some(FittedForest { trees, n_features });
        Ok(())
    }

    fn predict(&self, features: &[FeatureVector]) -> DriftResult<Vec<f64>> {
        let fitted = self.fitted()?;
        check_predict_input(features, fitted.n_features)?;

        let n_trees = fitted.trees.len() as f64;
        Ok(features
            .par_iter()
            .map(|x| fitted.trees.iter().map(|t| t.predict_row(x)).sum::<f64>() / n_trees)
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn supports_feature_importance(&self) -> bool {
        true
    }

    /// Mean of per-tree normalized impurity decreases, renormalized to sum to 1.
    fn feature_importance(&self) -> DriftResult<Vec<f64>> {
        let fitted = self.fitted()?;

        let mut totals = vec![0.0; fitted.n_features];
        for tree in &fitted.trees {
            for (acc, v) in totals.iter_mut().zip(tree.normalized_importance()) {
                *acc += v;
            }
        }

        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            Ok(totals.into_iter().map(|v| v / sum).collect())
        } else {
            Ok(totals)
        }
    }
}
