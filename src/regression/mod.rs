//! Regression Strategies
//!
//! Four interchangeable single-output regressors behind the [`Regressor`]
//! trait:
//!
//! - **Random forest**: bootstrap CART ensemble, the only strategy with
//!   feature importance
//! - **Kernel SVR**: RBF epsilon-insensitive support vector regression
//! - **Linear**: ordinary least squares with intercept
//! - **Neural network**: two ReLU hidden layers trained with Adam
//!
//! All of them consume already-encoded [`FeatureVector`]s; scaling and
//! one-hot encoding happen upstream in [`crate::features`].

pub mod adam;
pub mod forest;
pub mod linear;
pub mod mlp;
pub mod svr;
pub mod tree;

pub use adam::AdamOptimizer;
pub use forest::{ForestConfig, MaxFeatures, RandomForest};
pub use linear::LinearRegression;
pub use mlp::{MlpConfig, NeuralNetwork};
pub use svr::{KernelSvr, SvrConfig};

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, DriftResult};
use crate::features::FeatureVector;
use crate::types::StrategyKind;

/// A single-output regression model.
pub trait Regressor: Send + Sync {
    /// Stable identifier used in errors and logs.
    fn name(&self) -> &'static str;

    /// Fit on encoded features. Refitting replaces the previous state.
    fn fit(&mut self, features: &[FeatureVector], labels: &[f64]) -> DriftResult<()>;

    /// Predict one value per input row.
    fn predict(&self, features: &[FeatureVector]) -> DriftResult<Vec<f64>>;

    fn is_fitted(&self) -> bool;

    fn supports_feature_importance(&self) -> bool {
        false
    }

    /// Per-feature importance aligned with the encoded feature order.
    fn feature_importance(&self) -> DriftResult<Vec<f64>> {
        Err(DriftError::UnsupportedOperation {
            operation: "feature_importance",
            strategy: self.name(),
        })
    }
}

/// Validate a training set and return its feature width.
pub(crate) fn check_training_data(features: &[FeatureVector], labels: &[f64]) -> DriftResult<usize> {
    let Some(first) = features.first() else {
        return Err(DriftError::EmptyDataset("no rows to fit on".to_string()));
    };
    if features.len() != labels.len() {
        return Err(DriftError::InvalidInput(format!(
            "{} feature rows but {} labels",
            features.len(),
            labels.len()
        )));
    }

    let width = first.len();
    if width == 0 {
        return Err(DriftError::InvalidInput("feature vectors are empty".to_string()));
    }
    check_rows(features, width)?;

    if let Some(i) = labels.iter().position(|y| !y.is_finite()) {
        return Err(DriftError::InvalidInput(format!("label at row {i} is not finite")));
    }
    Ok(width)
}

/// Validate inference rows against the fitted width.
pub(crate) fn check_predict_input(features: &[FeatureVector], n_features: usize) -> DriftResult<()> {
    check_rows(features, n_features)
}

fn check_rows(features: &[FeatureVector], width: usize) -> DriftResult<()> {
    for (i, f) in features.iter().enumerate() {
        if f.len() != width {
            return Err(DriftError::InvalidInput(format!(
                "row {i} has {} features, expected {width}",
                f.len()
            )));
        }
        if f.as_slice().iter().any(|v| !v.is_finite()) {
            return Err(DriftError::InvalidInput(format!("row {i} contains non-finite features")));
        }
    }
    Ok(())
}

/// Hyperparameters for every strategy, `[regression.*]` in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    pub forest: ForestConfig,
    pub svr: SvrConfig,
    pub mlp: MlpConfig,
}

/// Closed set of concrete regressors selected by [`StrategyKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegressionModel {
    RandomForest(RandomForest),
    KernelSvr(KernelSvr),
    Linear(LinearRegression),
    NeuralNetwork(NeuralNetwork),
}

impl RegressionModel {
    /// Build an unfitted model for `kind`.
    pub fn for_strategy(kind: StrategyKind, config: &RegressionConfig) -> Self {
        match kind {
            StrategyKind::RandomForest => Self::RandomForest(RandomForest::new(config.forest.clone())),
            StrategyKind::KernelSvr => Self::KernelSvr(KernelSvr::new(config.svr.clone())),
            StrategyKind::Linear => Self::Linear(LinearRegression::new()),
            StrategyKind::NeuralNetwork => Self::NeuralNetwork(NeuralNetwork::new(config.mlp.clone())),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::RandomForest(_) => StrategyKind::RandomForest,
            Self::KernelSvr(_) => StrategyKind::KernelSvr,
            Self::Linear(_) => StrategyKind::Linear,
            Self::NeuralNetwork(_) => StrategyKind::NeuralNetwork,
        }
    }

    fn inner(&self) -> &dyn Regressor {
        match self {
            Self::RandomForest(m) => m,
            Self::KernelSvr(m) => m,
            Self::Linear(m) => m,
            Self::NeuralNetwork(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Regressor {
        match self {
            Self::RandomForest(m) => m,
            Self::KernelSvr(m) => m,
            Self::Linear(m) => m,
            Self::NeuralNetwork(m) => m,
        }
    }
}

impl Regressor for RegressionModel {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[f64]) -> DriftResult<()> {
        self.inner_mut().fit(features, labels)
    }

    fn predict(&self, features: &[FeatureVector]) -> DriftResult<Vec<f64>> {
        self.inner().predict(features)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn supports_feature_importance(&self) -> bool {
        self.inner().supports_feature_importance()
    }

    fn feature_importance(&self) -> DriftResult<Vec<f64>> {
        self.inner().feature_importance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_matches_strategy() {
        let config = RegressionConfig::default();
        for kind in StrategyKind::ALL {
            let model = RegressionModel::for_strategy(kind, &config);
            assert_eq!(model.kind(), kind);
            assert_eq!(model.name(), kind.as_str());
            assert_eq!(model.supports_feature_importance(), kind.supports_feature_importance());
            assert!(!model.is_fitted());
        }
    }

    #[test]
    fn test_check_training_data_rejects_bad_input() {
        assert!(matches!(
            check_training_data(&[], &[]),
            Err(DriftError::EmptyDataset(_))
        ));

        let rows = vec![
            FeatureVector::from_values(vec![1.0, 2.0]),
            FeatureVector::from_values(vec![1.0]),
        ];
        assert!(matches!(
            check_training_data(&rows, &[1.0, 2.0]),
            Err(DriftError::InvalidInput(_))
        ));

        let rows = vec![FeatureVector::from_values(vec![1.0, 2.0])];
        assert!(matches!(
            check_training_data(&rows, &[1.0, 2.0]),
            Err(DriftError::InvalidInput(_))
        ));
        assert!(matches!(
            check_training_data(&rows, &[f64::NAN]),
            Err(DriftError::InvalidInput(_))
        ));
        assert_eq!(check_training_data(&rows, &[3.0]).ok(), Some(2));
    }
}
