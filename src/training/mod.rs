//! Dual-Target Trainer/Evaluator
//!
//! Splits labelled records once, fits one feature transform on the training
//! partition, then fits an identically configured regressor per deviation
//! target and scores both on the shared test partition.
//!
//! Progress is reported at four checkpoints:
//!
//! | Checkpoint | Percent |
//! |---|---|
//! | data prepared | 20 |
//! | azimuth model fitted | 50 |
//! | inclination model fitted | 80 |
//! | metrics computed | 100 |

pub mod metrics;
pub mod model_pair;
pub mod split;
pub mod trainer;

pub use metrics::{r2_score, rmse};
pub use model_pair::{TargetModel, TrainedModelPair};
pub use split::{train_test_split, SplitIndices};
pub use trainer::{DualTargetTrainer, TrainingOptions};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic progress markers of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingCheckpoint {
    DataPrepared,
    AzimuthFitted,
    InclinationFitted,
    MetricsComputed,
}

impl TrainingCheckpoint {
    pub const ALL: [TrainingCheckpoint; 4] = [
        TrainingCheckpoint::DataPrepared,
        TrainingCheckpoint::AzimuthFitted,
        TrainingCheckpoint::InclinationFitted,
        TrainingCheckpoint::MetricsComputed,
    ];

    pub fn percent(&self) -> u8 {
        match self {
            TrainingCheckpoint::DataPrepared => 20,
            TrainingCheckpoint::AzimuthFitted => 50,
            TrainingCheckpoint::InclinationFitted => 80,
            TrainingCheckpoint::MetricsComputed => 100,
        }
    }
}

impl fmt::Display for TrainingCheckpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainingCheckpoint::DataPrepared => "data prepared",
            TrainingCheckpoint::AzimuthFitted => "azimuth model fitted",
            TrainingCheckpoint::InclinationFitted => "inclination model fitted",
            TrainingCheckpoint::MetricsComputed => "metrics computed",
        };
        f.write_str(name)
    }
}
