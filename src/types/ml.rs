//! Model selection and evaluation types: StrategyKind, TargetMetrics, TrainingMetrics

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DriftError;

/// Regression algorithm used for both deviation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Bootstrap ensemble of regression trees
    #[default]
    RandomForest,
    /// Epsilon-insensitive support vector regression with RBF kernel
    KernelSvr,
    /// Ordinary least squares
    Linear,
    /// Two-hidden-layer perceptron
    NeuralNetwork,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::RandomForest,
        StrategyKind::KernelSvr,
        StrategyKind::Linear,
        StrategyKind::NeuralNetwork,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RandomForest => "random_forest",
            StrategyKind::KernelSvr => "kernel_svr",
            StrategyKind::Linear => "linear",
            StrategyKind::NeuralNetwork => "neural_network",
        }
    }

    /// Human-readable name for reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyKind::RandomForest => "Random Forest",
            StrategyKind::KernelSvr => "Support Vector Regression",
            StrategyKind::Linear => "Linear Regression",
            StrategyKind::NeuralNetwork => "Neural Network",
        }
    }

    /// Whether fitted models of this kind expose per-feature importance.
    pub fn supports_feature_importance(&self) -> bool {
        matches!(self, StrategyKind::RandomForest)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "random_forest" | "forest" | "rf" => Ok(StrategyKind::RandomForest),
            "kernel_svr" | "svr" | "svm" => Ok(StrategyKind::KernelSvr),
            "linear" | "ols" | "linear_regression" => Ok(StrategyKind::Linear),
            "neural_network" | "mlp" | "nn" => Ok(StrategyKind::NeuralNetwork),
            other => Err(DriftError::InvalidInput(format!(
                "unknown strategy '{other}' (expected random_forest, kernel_svr, linear or neural_network)"
            ))),
        }
    }
}

/// Which deviation a model predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationTarget {
    Azimuth,
    Inclination,
}

impl fmt::Display for DeviationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviationTarget::Azimuth => f.write_str("azimuth"),
            DeviationTarget::Inclination => f.write_str("inclination"),
        }
    }
}

/// Relative importance of one encoded feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Encoded feature name, e.g. `depth_final` or `rock_type=Granite`
    pub feature: String,
    /// Normalized importance (all features sum to 1, or all zero)
    pub importance: f64,
}

/// Held-out accuracy for one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMetrics {
    pub target: DeviationTarget,
    /// Root-mean-squared error on the test partition (degrees)
    pub rmse: f64,
    /// Coefficient of determination; negative when worse than the mean
    pub r2: f64,
    /// `(actual, predicted)` for every test row, in test-partition order
    pub test_pairs: Vec<(f64, f64)>,
    /// Present only for strategies that support importance extraction
    pub feature_importance: Option<Vec<FeatureImportance>>,
}

impl TargetMetrics {
    /// Importances sorted from most to least important.
    pub fn ranked_importance(&self) -> Vec<FeatureImportance> {
        let mut ranked = self.feature_importance.clone().unwrap_or_default();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked
    }
}

/// Metrics of a full dual-target training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub strategy: StrategyKind,
    pub train_rows: usize,
    pub test_rows: usize,
    pub azimuth: TargetMetrics,
    pub inclination: TargetMetrics,
}

impl TrainingMetrics {
    /// Mean R² over both targets.
    pub fn mean_r2(&self) -> f64 {
        (self.azimuth.r2 + self.inclination.r2) / 2.0
    }

    pub fn performance(&self) -> PerformanceRating {
        PerformanceRating::from_r2(self.mean_r2())
    }
}

/// Qualitative model quality derived from mean R².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Excellent,
    Good,
    Moderate,
    Limited,
}

impl PerformanceRating {
    pub fn from_r2(r2: f64) -> Self {
        if r2 > 0.8 {
            PerformanceRating::Excellent
        } else if r2 > 0.7 {
            PerformanceRating::Good
        } else if r2 > 0.5 {
            PerformanceRating::Moderate
        } else {
            PerformanceRating::Limited
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PerformanceRating::Excellent => {
                "The models capture the factors driving deviation very well; predictions can be used with high confidence for hole planning."
            }
            PerformanceRating::Good => {
                "The models capture the main deviation trends; predictions are reliable for most drilling conditions."
            }
            PerformanceRating::Moderate => {
                "The models capture general trends but lack precision in some cases; use predictions as indicators and plan safety margins."
            }
            PerformanceRating::Limited => {
                "The models struggle to capture what drives deviation; use predictions with caution and consider additional inputs."
            }
        }
    }
}

impl fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PerformanceRating::Excellent => "Excellent",
            PerformanceRating::Good => "Good",
            PerformanceRating::Moderate => "Moderate",
            PerformanceRating::Limited => "Limited",
        };
        f.write_str(s)
    }
}
