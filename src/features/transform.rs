//! Fitted feature transform: standardized numerics + one-hot rock type.
//!
//! Layout of every encoded vector (fixed at fit time):
//!
//! ```text
//! [depth_final, azimuth_initial, inclination_initial, rotation_speed,
//!  rock_type=<first seen>, rock_type=<second seen>, ...]
//! ```
//!
//! Model coefficients and importances are positional, so this order must
//! never change between `fit` and later `apply` calls.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::error::{DriftError, DriftResult};
use crate::types::DrillingRecord;

/// Number of continuous input features.
pub const NUM_NUMERIC_FEATURES: usize = 4;

/// Continuous feature names (matches `DrillingRecord::numeric_inputs` order).
pub const NUMERIC_FEATURE_NAMES: [&str; NUM_NUMERIC_FEATURES] = [
    "depth_final",
    "azimuth_initial",
    "inclination_initial",
    "rotation_speed",
];

/// Relative tolerance under which a column's spread is treated as zero.
const CONSTANT_COLUMN_EPS: f64 = 1e-12;

/// Encoded, fixed-width numeric representation of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::ops::Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, idx: usize) -> &f64 {
        &self.values[idx]
    }
}

/// Statistics captured from the fit set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTransform {
    means: [f64; NUM_NUMERIC_FEATURES],
    /// Population standard deviation; `0.0` marks a constant column
    stds: [f64; NUM_NUMERIC_FEATURES],
    /// Rock types in first-seen order
    categories: Vec<String>,
}

impl FeatureTransform {
    /// Capture scaling statistics and the rock-type vocabulary.
    pub fn fit(records: &[DrillingRecord]) -> DriftResult<Self> {
        if records.is_empty() {
            return Err(DriftError::EmptyDataset(
                "cannot fit feature transform on zero records".to_string(),
            ));
        }
        for record in records {
            check_record(record)?;
        }

        let mut means = [0.0; NUM_NUMERIC_FEATURES];
        let mut stds = [0.0; NUM_NUMERIC_FEATURES];

        for i in 0..NUM_NUMERIC_FEATURES {
            let column: Vec<f64> = records.iter().map(|r| r.numeric_inputs()[i]).collect();
            let mean = column.iter().mean();
            let std = column.iter().population_std_dev();

            means[i] = mean;
            stds[i] = if std.is_finite() && std > CONSTANT_COLUMN_EPS * mean.abs().max(1.0) {
                std
            } else {
                0.0
            };
        }

        let mut categories: Vec<String> = Vec::new();
        for record in records {
            if !categories.iter().any(|c| c == &record.rock_type) {
                categories.push(record.rock_type.clone());
            }
        }

        debug!(
            rows = records.len(),
            rock_types = categories.len(),
            "Feature transform fitted"
        );

        Ok(Self { means, stds, categories })
    }

    /// Encode records with the fitted statistics.
    ///
    /// Rock types outside the fit vocabulary encode as all-zero indicators.
    pub fn apply(&self, records: &[DrillingRecord]) -> DriftResult<Vec<FeatureVector>> {
        records.iter().map(|r| self.apply_one(r)).collect()
    }

    /// Encode a single record.
    pub fn apply_one(&self, record: &DrillingRecord) -> DriftResult<FeatureVector> {
        check_record(record)?;

        let mut values = Vec::with_capacity(self.width());
        for (i, x) in record.numeric_inputs().into_iter().enumerate() {
            let std = self.stds[i];
            values.push(if std == 0.0 { 0.0 } else { (x - self.means[i]) / std });
        }
        values.extend(
            self.categories
                .iter()
                .map(|c| if *c == record.rock_type { 1.0 } else { 0.0 }),
        );

        Ok(FeatureVector { values })
    }

    /// Width of every encoded vector.
    pub fn width(&self) -> usize {
        NUM_NUMERIC_FEATURES + self.categories.len()
    }

    /// Rock types seen at fit time, in indicator order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Whether a rock type is part of the fitted vocabulary.
    pub fn knows_rock_type(&self, rock_type: &str) -> bool {
        self.categories.iter().any(|c| c == rock_type)
    }

    /// Encoded feature names in vector order.
    pub fn feature_names(&self) -> Vec<String> {
        NUMERIC_FEATURE_NAMES
            .iter()
            .map(|s| (*s).to_string())
            .chain(self.categories.iter().map(|c| format!("rock_type={c}")))
            .collect()
    }
}

/// Reject records with missing (non-finite) numerics or an empty rock type.
fn check_record(record: &DrillingRecord) -> DriftResult<()> {
    let missing: Vec<String> = NUMERIC_FEATURE_NAMES
        .iter()
        .zip(record.numeric_inputs())
        .filter(|(_, v)| !v.is_finite())
        .map(|(name, _)| (*name).to_string())
        .chain(
            record
                .rock_type
                .trim()
                .is_empty()
                .then(|| "rock_type".to_string()),
        )
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DriftError::Schema(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<DrillingRecord> {
        vec![
            DrillingRecord::new(100.0, 10.0, -45.0, "Granite", 80.0),
            DrillingRecord::new(200.0, 90.0, -60.0, "Schist", 120.0),
            DrillingRecord::new(300.0, 180.0, -30.0, "Granite", 160.0),
            DrillingRecord::new(400.0, 270.0, -75.0, "Gneiss", 200.0),
        ]
    }

    #[test]
    fn test_fit_empty_fails() {
        let result = FeatureTransform::fit(&[]);
        assert!(matches!(result, Err(DriftError::EmptyDataset(_))));
    }

    #[test]
    fn test_layout_and_names() {
        let transform = FeatureTransform::fit(&sample_records()).expect("fit");
        assert_eq!(transform.width(), 7);
        assert_eq!(transform.categories(), &["Granite", "Schist", "Gneiss"]);
        assert_eq!(
            transform.feature_names(),
            vec![
                "depth_final",
                "azimuth_initial",
                "inclination_initial",
                "rotation_speed",
                "rock_type=Granite",
                "rock_type=Schist",
                "rock_type=Gneiss",
            ]
        );
    }

    #[test]
    fn test_standardized_columns_have_zero_mean_unit_variance() {
        let records = sample_records();
        let transform = FeatureTransform::fit(&records).expect("fit");
        let encoded = transform.apply(&records).expect("apply");

        for col in 0..NUM_NUMERIC_FEATURES {
            let values: Vec<f64> = encoded.iter().map(|v| v[col]).collect();
            let mean: f64 = values.iter().sum::<f64>() / values.len() as f64;
            let var: f64 =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
            assert!(mean.abs() < 1e-12, "column {col} mean {mean}");
            assert!((var - 1.0).abs() < 1e-9, "column {col} variance {var}");
        }
    }

    #[test]
    fn test_apply_is_deterministic() {
        let records = sample_records();
        let transform = FeatureTransform::fit(&records).expect("fit");
        let first = transform.apply(&records).expect("apply");
        let second = transform.apply(&records).expect("apply");
        assert_eq!(first, second);
    }

    #[test]
    fn test_constant_column_encodes_to_zero() {
        let records: Vec<DrillingRecord> = (0..5)
            .map(|i| DrillingRecord::new(100.0 + f64::from(i), 0.1, -45.0, "Granite", 120.0))
            .collect();
        let transform = FeatureTransform::fit(&records).expect("fit");

        for v in transform.apply(&records).expect("apply") {
            assert_eq!(v[1], 0.0);
            assert_eq!(v[2], 0.0);
            assert_eq!(v[3], 0.0);
            assert!(v.as_slice().iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn test_unseen_rock_type_is_all_zero() {
        let transform = FeatureTransform::fit(&sample_records()).expect("fit");
        let novel = DrillingRecord::new(250.0, 45.0, -50.0, "Marble", 100.0);
        let encoded = transform.apply_one(&novel).expect("unseen category must not fail");
        assert!(encoded.as_slice()[NUM_NUMERIC_FEATURES..].iter().all(|&x| x == 0.0));
        assert!(!transform.knows_rock_type("Marble"));
    }

    #[test]
    fn test_missing_field_is_schema_error() {
        let transform = FeatureTransform::fit(&sample_records()).expect("fit");
        let bad = DrillingRecord::new(f64::NAN, 45.0, -50.0, "", 100.0);
        match transform.apply_one(&bad) {
            Err(DriftError::Schema(fields)) => {
                assert_eq!(fields, vec!["depth_final".to_string(), "rock_type".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }
}
