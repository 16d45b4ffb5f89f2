//! Error types shared by every stage of the drift engine.
//!
//! Lower layers (feature transform, regressors, trajectory geometry) fail
//! fast with the most specific variant. The dual-target trainer wraps any
//! failure that happens inside its multi-step sequence in
//! [`DriftError::Training`], keeping the original error as `source()`.

use thiserror::Error;

use crate::training::TrainingCheckpoint;

/// Result alias used throughout the library.
pub type DriftResult<T> = Result<T, DriftError>;

#[derive(Debug, Error)]
pub enum DriftError {
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Schema error: missing or invalid field(s): {}", .0.join(", "))]
    Schema(Vec<String>),

    #[error("Model not trained: {0}")]
    NotTrained(&'static str),

    #[error("Unsupported operation: {operation} is not available for {strategy}")]
    UnsupportedOperation {
        operation: &'static str,
        strategy: &'static str,
    },

    #[error("Training failed before checkpoint '{stage}': {source}")]
    Training {
        stage: TrainingCheckpoint,
        #[source]
        source: Box<DriftError>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Numerical failure: {0}")]
    Numerical(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriftError {
    /// Shorthand for a schema error naming a single field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::Schema(vec![field.into()])
    }

    /// Wrap an error raised inside the training sequence.
    pub(crate) fn training(stage: TrainingCheckpoint, source: DriftError) -> Self {
        Self::Training {
            stage,
            source: Box::new(source),
        }
    }

    /// The innermost error, unwrapping any `Training` layers.
    pub fn root_cause(&self) -> &DriftError {
        match self {
            Self::Training { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
