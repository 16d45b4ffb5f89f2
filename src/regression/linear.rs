//! Ordinary least squares with intercept.
//!
//! Inputs and labels are centred, then the normal equations `XᵀX w = Xᵀy`
//! are solved by Gauss-Jordan elimination with partial pivoting. Columns
//! whose pivot vanishes (e.g. the last one-hot indicator, which is a linear
//! combination of the others plus the intercept) are left at zero; any
//! least-squares solution gives the same fitted values.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_predict_input, check_training_data, Regressor};
use crate::error::{DriftError, DriftResult};
use crate::features::FeatureVector;

/// Pivot threshold relative to the largest diagonal entry.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedLinear {
    coefficients: Vec<f64>,
    intercept: f64,
    rank: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    fitted: Option<FittedLinear>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitted coefficients in feature order.
    pub fn coefficients(&self) -> DriftResult<&[f64]> {
        self.fitted
            .as_ref()
            .map(|f| f.coefficients.as_slice())
            .ok_or(DriftError::NotTrained("linear model has not been fitted"))
    }

    pub fn intercept(&self) -> DriftResult<f64> {
        self.fitted
            .as_ref()
            .map(|f| f.intercept)
            .ok_or(DriftError::NotTrained("linear model has not been fitted"))
    }

    /// Numerical rank of the centred design matrix.
    pub fn rank(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.rank)
    }
}

/// Solve `a · w = b` for symmetric positive semi-definite `a` (row-major,
/// `p × p`). Returns the solution and the number of pivots used.
fn solve_normal_equations(mut a: Vec<f64>, mut b: Vec<f64>) -> (Vec<f64>, usize) {
    let p = b.len();
    let scale = (0..p).map(|i| a[i * p + i].abs()).fold(0.0, f64::max);
    let tol = RANK_TOLERANCE * scale.max(f64::MIN_POSITIVE);

    let mut pivot_row_of = vec![None; p];
    let mut row = 0;

    for col in 0..p {
        if row == p {
            break;
        }

        let (best, best_abs) = (row..p)
            .map(|r| (r, a[r * p + col].abs()))
            .fold((row, -1.0), |acc, cand| if cand.1 > acc.1 { cand } else { acc });
        if best_abs <= tol {
            continue;
        }

        if best != row {
            for k in 0..p {
                a.swap(best * p + k, row * p + k);
            }
            b.swap(best, row);
        }

        let pivot = a[row * p + col];
        for r in 0..p {
            if r == row {
                continue;
            }
            let factor = a[r * p + col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..p {
                a[r * p + k] -= factor * a[row * p + k];
            }
            b[r] -= factor * b[row];
        }

        pivot_row_of[col] = Some(row);
        row += 1;
    }

    let solution = pivot_row_of
        .iter()
        .enumerate()
        .map(|(col, r)| r.map_or(0.0, |r| b[r] / a[r * p + col]))
        .collect();
    (solution, row)
}

impl Regressor for LinearRegression {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[f64]) -> DriftResult<()> {
        let p = check_training_data(features, labels)?;
        let n = features.len() as f64;

        let mut x_mean = vec![0.0; p];
        for f in features {
            for (m, v) in x_mean.iter_mut().zip(f.as_slice()) {
                *m += v / n;
            }
        }
        let y_mean = labels.iter().sum::<f64>() / n;

        let mut xtx = vec![0.0; p * p];
        let mut xty = vec![0.0; p];
        let mut centred = vec![0.0; p];
        for (f, y) in features.iter().zip(labels) {
            for (c, (v, m)) in centred.iter_mut().zip(f.as_slice().iter().zip(&x_mean)) {
                *c = v - m;
            }
            let yc = y - y_mean;
            for i in 0..p {
                xty[i] += centred[i] * yc;
                for j in i..p {
                    xtx[i * p + j] += centred[i] * centred[j];
                }
            }
        }
        for i in 0..p {
            for j in 0..i {
                xtx[i * p + j] = xtx[j * p + i];
            }
        }

        let (coefficients, rank) = solve_normal_equations(xtx, xty);
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(DriftError::Numerical(
                "least-squares solve produced non-finite coefficients".to_string(),
            ));
        }
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        debug!(features = p, rank, intercept, "Linear model fitted");

        self.fitted = Some(FittedLinear {
            coefficients,
            intercept,
            rank,
        });
        Ok(())
    }

    fn predict(&self, features: &[FeatureVector]) -> DriftResult<Vec<f64>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(DriftError::NotTrained("linear model has not been fitted"))?;
        check_predict_input(features, fitted.coefficients.len())?;

        Ok(features
            .iter()
            .map(|f| {
                fitted.intercept
                    + f.as_slice()
                        .iter()
                        .zip(&fitted.coefficients)
                        .map(|(v, c)| v * c)
                        .sum::<f64>()
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_plane() {
        let features: Vec<FeatureVector> = (0..30)
            .map(|i| {
                let a = f64::from(i);
                let b = f64::from((i * 7) % 11);
                FeatureVector::from_values(vec![a, b])
            })
            .collect();
        let labels: Vec<f64> = features.iter().map(|f| 3.0 + 2.0 * f[0] - 0.5 * f[1]).collect();

        let mut model = LinearRegression::new();
        model.fit(&features, &labels).expect("fit");

        let coef = model.coefficients().expect("coef");
        assert!((coef[0] - 2.0).abs() < 1e-9);
        assert!((coef[1] + 0.5).abs() < 1e-9);
        assert!((model.intercept().expect("intercept") - 3.0).abs() < 1e-9);
        assert_eq!(model.rank(), Some(2));
    }

    #[test]
    fn test_collinear_one_hot_columns_still_fit() {
        // Two indicators that always sum to 1: collinear with the intercept.
        let features: Vec<FeatureVector> = (0..20)
            .map(|i| {
                let x = f64::from(i);
                let (a, b) = if i % 2 == 0 { (1.0, 0.0) } else { (0.0, 1.0) };
                FeatureVector::from_values(vec![x, a, b])
            })
            .collect();
        let labels: Vec<f64> = features
            .iter()
            .map(|f| 1.5 * f[0] + if f[1] == 1.0 { 4.0 } else { -2.0 })
            .collect();

        let mut model = LinearRegression::new();
        model.fit(&features, &labels).expect("fit");

        assert_eq!(model.rank(), Some(2));
        let preds = model.predict(&features).expect("predict");
        for (p, y) in preds.iter().zip(&labels) {
            assert!((p - y).abs() < 1e-8, "prediction {p} vs label {y}");
        }
    }

    #[test]
    fn test_predict_before_fit_is_not_trained() {
        let model = LinearRegression::new();
        let x = vec![FeatureVector::from_values(vec![1.0])];
        assert!(matches!(model.predict(&x), Err(DriftError::NotTrained(_))));
        assert!(matches!(
            model.feature_importance(),
            Err(DriftError::UnsupportedOperation { .. })
        ));
    }
}
