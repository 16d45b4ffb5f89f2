//! bore-drift: drill hole deviation prediction
//!
//! Learns how a drill hole's azimuth and inclination drift away from the
//! planned orientation, then reconstructs the predicted 3-D path against
//! the ideal straight one.
//!
//! ## Architecture
//!
//! - **Features**: standardized numerics plus one-hot rock type, fitted once
//! - **Regression**: random forest, kernel SVR, OLS or MLP behind one trait
//! - **Training**: dual-target trainer producing a model pair and held-out metrics
//! - **Trajectory**: path reconstruction and severity scoring
//! - **Dataset**: CSV ingestion, demo data, exploratory statistics

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod regression;
pub mod report;
pub mod training;
pub mod trajectory;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, DriftConfig};

// Re-export errors
pub use error::{DriftError, DriftResult};

// Re-export commonly used types
pub use types::{
    DeviationLabels, DeviationTarget, DrillingRecord, PerformanceRating, PredictedDeviation,
    StrategyKind, TargetMetrics, TrainingMetrics, TrajectoryResult,
};

// Re-export the engine
pub use features::FeatureTransform;
pub use regression::{RegressionConfig, RegressionModel, Regressor};
pub use training::{DualTargetTrainer, TrainedModelPair, TrainingCheckpoint, TrainingOptions};
pub use trajectory::{reconstruct, reconstruct_with, DeviationSeverity, SeverityThresholds};

// Re-export reporting
pub use report::DeviationReport;
