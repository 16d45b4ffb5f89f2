//! Engine Configuration Module
//!
//! Training split, regression hyperparameters, trajectory sampling and
//! severity thresholds, loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `BORE_DRIFT_CONFIG` environment variable (path to TOML file)
//! 2. `drift_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! The loaded config is passed to whatever needs it:
//!
//! ```ignore
//! let config = DriftConfig::load();
//! let pair = config.trainer().train(&records, config.training.strategy)?;
//! ```

mod drift_config;
pub mod validation;

pub use drift_config::*;
pub use validation::ValidationWarning;
