//! Trained Model Pair: one fitted (transform, regressor) unit per target.
//!
//! A pair is produced whole by a training run and never mutated afterwards;
//! it is `Send + Sync` so any number of inference calls can share it.

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, DriftResult};
use crate::features::FeatureTransform;
use crate::regression::{RegressionModel, Regressor};
use crate::types::{DeviationTarget, DrillingRecord, PredictedDeviation, StrategyKind};

/// Fitted transform + regressor for a single deviation target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetModel {
    target: DeviationTarget,
    transform: FeatureTransform,
    model: RegressionModel,
}

impl TargetModel {
    pub(crate) fn new(
        target: DeviationTarget,
        transform: FeatureTransform,
        model: RegressionModel,
    ) -> Self {
        Self {
            target,
            transform,
            model,
        }
    }

    pub fn target(&self) -> DeviationTarget {
        self.target
    }

    pub fn transform(&self) -> &FeatureTransform {
        &self.transform
    }

    pub fn model(&self) -> &RegressionModel {
        &self.model
    }

    /// Predict this target's deviation for each record.
    pub fn predict(&self, records: &[DrillingRecord]) -> DriftResult<Vec<f64>> {
        let features = self.transform.apply(records)?;
        self.model.predict(&features)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModelPair {
    strategy: StrategyKind,
    azimuth: TargetModel,
    inclination: TargetModel,
}

impl TrainedModelPair {
    pub(crate) fn new(strategy: StrategyKind, azimuth: TargetModel, inclination: TargetModel) -> Self {
        Self {
            strategy,
            azimuth,
            inclination,
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn azimuth(&self) -> &TargetModel {
        &self.azimuth
    }

    pub fn inclination(&self) -> &TargetModel {
        &self.inclination
    }

    /// Predict both deviations for a single inference record.
    ///
    /// Labels on the record, if any, are ignored. A rock type unseen during
    /// training encodes as all-zero indicators rather than failing.
    pub fn predict(&self, record: &DrillingRecord) -> DriftResult<PredictedDeviation> {
        self.predict_batch(std::slice::from_ref(record))?
            .into_iter()
            .next()
            .ok_or_else(|| DriftError::Numerical("model returned no prediction".to_string()))
    }

    pub fn predict_batch(&self, records: &[DrillingRecord]) -> DriftResult<Vec<PredictedDeviation>> {
        let azimuth = self.azimuth.predict(records)?;
        let inclination = self.inclination.predict(records)?;
        Ok(azimuth
            .into_iter()
            .zip(inclination)
            .map(|(azimuth, inclination)| PredictedDeviation {
                azimuth,
                inclination,
            })
            .collect())
    }
}
