//! Feature Transform Stage
//!
//! Turns `DrillingRecord`s into fixed-width numeric vectors: continuous inputs
//! are standardized with statistics captured at fit time, rock type is
//! one-hot encoded over the fit vocabulary with an all-zero fallback for
//! unseen values.

pub mod transform;

pub use transform::{
    FeatureTransform, FeatureVector, NUMERIC_FEATURE_NAMES, NUM_NUMERIC_FEATURES,
};
