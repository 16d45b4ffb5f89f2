//! Shared data structures for drill hole deviation prediction
//!
//! - `DrillingRecord`: one observation (inputs + optional measured deviations)
//! - `StrategyKind`, `TargetMetrics`, `TrainingMetrics`: model selection and evaluation
//! - `TrajectoryResult`: reconstructed 3-D path and deviation scores

mod drilling;
mod ml;
mod trajectory;

pub use drilling::*;
pub use ml::*;
pub use trajectory::*;
