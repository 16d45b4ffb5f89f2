//! DriftConfig: TOML-backed settings for training, regression
//! hyperparameters, trajectory sampling and severity thresholds.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::DriftError;
use crate::regression::RegressionConfig;
use crate::training::{DualTargetTrainer, TrainingOptions};
use crate::trajectory::SeverityThresholds;
use crate::types::StrategyKind;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "BORE_DRIFT_CONFIG";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "drift_config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub training: TrainingSection,
    pub regression: RegressionConfig,
    pub trajectory: TrajectorySection,
    pub severity: SeverityThresholds,
}

/// `[training]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSection {
    pub test_fraction: f64,
    pub seed: u64,
    /// Strategy used when the caller does not pick one
    pub strategy: StrategyKind,
}

impl Default for TrainingSection {
    fn default() -> Self {
        let options = TrainingOptions::default();
        Self {
            test_fraction: options.test_fraction,
            seed: options.seed,
            strategy: StrategyKind::default(),
        }
    }
}

/// `[trajectory]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectorySection {
    /// Points per reconstructed path, both ends included
    pub sample_count: usize,
}

impl Default for TrajectorySection {
    fn default() -> Self {
        Self { sample_count: 100 }
    }
}

impl DriftConfig {
    /// Load configuration using the standard search order:
    /// 1. `$BORE_DRIFT_CONFIG`
    /// 2. `./drift_config.toml`
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load and validate a specific TOML file.
    ///
    /// Unknown keys are logged as warnings (with a suggestion when one is
    /// close) and never fail the load.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Range checks; every problem is reported at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = super::validation::range_errors(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            test_fraction: self.training.test_fraction,
            seed: self.training.seed,
        }
    }

    /// Trainer configured from `[training]` and `[regression.*]`.
    pub fn trainer(&self) -> DualTargetTrainer {
        DualTargetTrainer::new(self.regression.clone(), self.training_options())
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for DriftError {
    fn from(e: ConfigError) -> Self {
        DriftError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DriftConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.training.test_fraction, 0.2);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.training.strategy, StrategyKind::RandomForest);
        assert_eq!(config.regression.forest.n_trees, 100);
        assert_eq!(config.regression.mlp.hidden_layers, [100, 50]);
        assert_eq!(config.trajectory.sample_count, 100);
        assert_eq!(config.severity.high_deg, 15.0);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = DriftConfig::from_toml_str(
            r#"
            [training]
            strategy = "kernel_svr"

            [regression.forest]
            n_trees = 25
            "#,
        )
        .expect("valid config");

        assert_eq!(config.training.strategy, StrategyKind::KernelSvr);
        assert_eq!(config.training.test_fraction, 0.2);
        assert_eq!(config.regression.forest.n_trees, 25);
        assert_eq!(config.regression.forest.min_samples_leaf, 1);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = DriftConfig::default();
        config.severity.moderate_deg = 3.0;
        config.regression.svr.gamma = Some(0.5);
        let text = config.to_toml().expect("serialize");
        assert_eq!(DriftConfig::from_toml_str(&text).expect("parse"), config);
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let err = DriftConfig::load_from_file(Path::new("/nonexistent/drift_config.toml"))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
