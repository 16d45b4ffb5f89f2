//! Dual-target training run.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::metrics::{r2_score, rmse};
use super::model_pair::{TargetModel, TrainedModelPair};
use super::split::train_test_split;
use super::TrainingCheckpoint;
use crate::error::{DriftError, DriftResult};
use crate::features::{FeatureTransform, FeatureVector};
use crate::regression::{RegressionConfig, RegressionModel, Regressor};
use crate::types::{
    DeviationTarget, DrillingRecord, FeatureImportance, StrategyKind, TargetMetrics,
    TrainingMetrics,
};

/// Split parameters for a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Share of rows held out for scoring, in `(0, 1)`
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Fits one transform and one regressor per deviation target.
#[derive(Debug, Clone, Default)]
pub struct DualTargetTrainer {
    regression: RegressionConfig,
    options: TrainingOptions,
}

/// Output of fitting and scoring one target.
struct FittedTarget {
    model: RegressionModel,
    predictions: Vec<f64>,
}

fn target_label(record: &DrillingRecord, target: DeviationTarget) -> f64 {
    match (record.deviation, target) {
        (Some(d), DeviationTarget::Azimuth) => d.azimuth,
        (Some(d), DeviationTarget::Inclination) => d.inclination,
        (None, _) => f64::NAN,
    }
}

fn labels_for(records: &[DrillingRecord], target: DeviationTarget) -> Vec<f64> {
    records.iter().map(|r| target_label(r, target)).collect()
}

/// Every record must carry both finite labels.
fn check_labels(records: &[DrillingRecord]) -> DriftResult<()> {
    let mut problems = Vec::new();
    for (i, record) in records.iter().enumerate() {
        match record.deviation {
            None => problems.push(format!("deviation_azimuth, deviation_inclination (row {i})")),
            Some(d) => {
                if !d.azimuth.is_finite() {
                    problems.push(format!("deviation_azimuth (row {i})"));
                }
                if !d.inclination.is_finite() {
                    problems.push(format!("deviation_inclination (row {i})"));
                }
            }
        }
        if problems.len() >= 10 {
            break;
        }
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(DriftError::Schema(problems))
    }
}

impl DualTargetTrainer {
    pub fn new(regression: RegressionConfig, options: TrainingOptions) -> Self {
        Self { regression, options }
    }

    pub fn options(&self) -> TrainingOptions {
        self.options
    }

    /// Train both targets. See [`Self::train_with_progress`].
    pub fn train(
        &self,
        records: &[DrillingRecord],
        kind: StrategyKind,
    ) -> DriftResult<(TrainedModelPair, TrainingMetrics)> {
        self.train_with_progress(records, kind, &mut |_| {})
    }

    /// Train both targets, calling `progress` at each checkpoint.
    ///
    /// Argument problems (test fraction out of range, unlabelled records)
    /// are returned as-is. Anything that fails once the sequence has started
    /// is wrapped in [`DriftError::Training`] naming the checkpoint that was
    /// not reached; no model pair is produced in that case.
    pub fn train_with_progress(
        &self,
        records: &[DrillingRecord],
        kind: StrategyKind,
        progress: &mut dyn FnMut(TrainingCheckpoint),
    ) -> DriftResult<(TrainedModelPair, TrainingMetrics)> {
        let fraction = self.options.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(DriftError::InvalidInput(format!(
                "test_fraction must be in (0, 1), got {fraction}"
            )));
        }
        check_labels(records)?;

        info!(
            strategy = %kind,
            rows = records.len(),
            test_fraction = fraction,
            seed = self.options.seed,
            "Training started"
        );

        let mut stage = TrainingCheckpoint::DataPrepared;
        self.run(records, kind, progress, &mut stage)
            .map_err(|e| DriftError::training(stage, e))
    }

    fn run(
        &self,
        records: &[DrillingRecord],
        kind: StrategyKind,
        progress: &mut dyn FnMut(TrainingCheckpoint),
        stage: &mut TrainingCheckpoint,
    ) -> DriftResult<(TrainedModelPair, TrainingMetrics)> {
        let split = train_test_split(records.len(), self.options.test_fraction, self.options.seed);
        let train: Vec<DrillingRecord> = split.train.iter().map(|&i| records[i].clone()).collect();
        let test: Vec<DrillingRecord> = split.test.iter().map(|&i| records[i].clone()).collect();

        let transform = FeatureTransform::fit(&train)?;
        let x_train = transform.apply(&train)?;
        let x_test = transform.apply(&test)?;

        debug!(
            train_rows = train.len(),
            test_rows = test.len(),
            width = transform.width(),
            "Data prepared"
        );
        progress(TrainingCheckpoint::DataPrepared);

        *stage = TrainingCheckpoint::AzimuthFitted;
        let azimuth = self.fit_target(kind, DeviationTarget::Azimuth, &x_train, &train, &x_test)?;
        progress(TrainingCheckpoint::AzimuthFitted);

        *stage = TrainingCheckpoint::InclinationFitted;
        let inclination =
            self.fit_target(kind, DeviationTarget::Inclination, &x_train, &train, &x_test)?;
        progress(TrainingCheckpoint::InclinationFitted);

        *stage = TrainingCheckpoint::MetricsComputed;
        let feature_names = transform.feature_names();
        let azimuth_metrics =
            score_target(DeviationTarget::Azimuth, &azimuth, &test, &feature_names)?;
        let inclination_metrics =
            score_target(DeviationTarget::Inclination, &inclination, &test, &feature_names)?;

        let metrics = TrainingMetrics {
            strategy: kind,
            train_rows: train.len(),
            test_rows: test.len(),
            azimuth: azimuth_metrics,
            inclination: inclination_metrics,
        };
        info!(
            strategy = %kind,
            mean_r2 = metrics.mean_r2(),
            rating = %metrics.performance(),
            "Training complete"
        );
        progress(TrainingCheckpoint::MetricsComputed);

        let pair = TrainedModelPair::new(
            kind,
            TargetModel::new(DeviationTarget::Azimuth, transform.clone(), azimuth.model),
            TargetModel::new(DeviationTarget::Inclination, transform, inclination.model),
        );
        Ok((pair, metrics))
    }

    fn fit_target(
        &self,
        kind: StrategyKind,
        target: DeviationTarget,
        x_train: &[FeatureVector],
        train: &[DrillingRecord],
        x_test: &[FeatureVector],
    ) -> DriftResult<FittedTarget> {
        let mut model = RegressionModel::for_strategy(kind, &self.regression);
        model.fit(x_train, &labels_for(train, target))?;
        let predictions = model.predict(x_test)?;
        debug!(%target, strategy = %kind, "Target model fitted");
        Ok(FittedTarget { model, predictions })
    }
}

fn score_target(
    target: DeviationTarget,
    fitted: &FittedTarget,
    test: &[DrillingRecord],
    feature_names: &[String],
) -> DriftResult<TargetMetrics> {
    if fitted.predictions.iter().any(|p| !p.is_finite()) {
        return Err(DriftError::Numerical(format!(
            "{target} model produced non-finite predictions"
        )));
    }

    let actual = labels_for(test, target);
    let rmse = rmse(&actual, &fitted.predictions);
    let r2 = r2_score(&actual, &fitted.predictions);

    let feature_importance = if fitted.model.supports_feature_importance() {
        let importance = fitted.model.feature_importance()?;
        Some(
            feature_names
                .iter()
                .zip(importance)
                .map(|(feature, importance)| FeatureImportance {
                    feature: feature.clone(),
                    importance,
                })
                .collect(),
        )
    } else {
        None
    };

    info!(%target, rmse, r2, "Target scored");

    Ok(TargetMetrics {
        target,
        rmse,
        r2,
        test_pairs: actual.into_iter().zip(fitted.predictions.iter().copied()).collect(),
        feature_importance,
    })
}
