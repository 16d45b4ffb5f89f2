//! Exploratory statistics over a drilling dataset.
//!
//! Mirrors what an analyst looks at before training: column ranges, rock
//! type balance, how far holes typically drift, and which inputs move with
//! the deviations.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

use crate::error::{DriftError, DriftResult};
use crate::types::DrillingRecord;

/// Correlations weaker than this are not reported.
pub const MIN_REPORTED_CORRELATION: f64 = 0.3;
/// Correlations above this are labelled strong.
pub const STRONG_CORRELATION: f64 = 0.7;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub name: &'static str,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RockTypeStats {
    pub rock_type: String,
    pub count: usize,
    /// `sqrt(mean(dev_az² + dev_inc²))` over labelled rows; `None` if unlabelled
    pub rms_deviation: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Correlation {
    pub a: &'static str,
    pub b: &'static str,
    pub r: f64,
    /// Two-tailed p-value for `r != 0`
    pub p_value: f64,
}

impl Correlation {
    pub fn strength(&self) -> &'static str {
        if self.r.abs() > STRONG_CORRELATION {
            "strong"
        } else {
            "moderate"
        }
    }

    pub fn direction(&self) -> &'static str {
        if self.r >= 0.0 {
            "positive"
        } else {
            "negative"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub labelled_rows: usize,
    pub columns: Vec<ColumnStats>,
    /// In first-seen order
    pub rock_types: Vec<RockTypeStats>,
    pub mean_abs_azimuth_deviation: Option<f64>,
    pub mean_abs_inclination_deviation: Option<f64>,
    /// `|r| > 0.3`, strongest first
    pub correlations: Vec<Correlation>,
}

/// Pearson correlation coefficient (0 when either column is constant).
///
/// Sums run over mean-centred values; large common offsets keep full precision.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let len = x.len().min(y.len());
    if len < 2 {
        return 0.0;
    }
    let (x, y) = (&x[..len], &y[..len]);
    let (x_mean, y_mean) = (x.iter().mean(), y.iter().mean());

    let (mut cross, mut x_spread, mut y_spread) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        let (dx, dy) = (a - x_mean, b - y_mean);
        cross += dx * dy;
        x_spread += dx * dx;
        y_spread += dy * dy;
    }

    let scale = (x_spread * y_spread).sqrt();
    if scale > 0.0 && scale.is_finite() {
        (cross / scale).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Two-tailed significance of a correlation `r` over `n` rows, testing
/// `t = r·sqrt(n-2)/sqrt(1-r²)` against Student's t with `n - 2` dof.
pub fn p_value_for_r(r: f64, n: usize) -> f64 {
    let dof = match n.checked_sub(2) {
        Some(d) if d > 0 => d as f64,
        _ => return 1.0,
    };
    let unexplained = 1.0 - r * r;
    if unexplained <= 1e-4 {
        // |r| ~ 1: the statistic diverges
        return 0.0;
    }

    let t = (r * (dof / unexplained).sqrt()).abs();
    StudentsT::new(0.0, 1.0, dof).map_or(1.0, |dist| (2.0 * dist.sf(t)).min(1.0))
}

fn column_stats(name: &'static str, values: &[f64]) -> ColumnStats {
    ColumnStats {
        name,
        count: values.len(),
        mean: values.iter().mean(),
        std_dev: values.iter().std_dev(),
        min: Statistics::min(values.iter()),
        max: Statistics::max(values.iter()),
    }
}

fn mean_abs(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64)
}

/// Summarize a dataset. Deviation statistics use labelled rows only.
pub fn summarize(records: &[DrillingRecord]) -> DriftResult<DatasetSummary> {
    if records.is_empty() {
        return Err(DriftError::EmptyDataset("nothing to summarize".to_string()));
    }

    let column = |f: fn(&DrillingRecord) -> f64| records.iter().map(f).collect::<Vec<f64>>();
    let mut columns: Vec<(&'static str, Vec<f64>)> = vec![
        ("depth_final", column(|r| r.depth_final)),
        ("azimuth_initial", column(|r| r.azimuth_initial)),
        ("inclination_initial", column(|r| r.inclination_initial)),
        ("rotation_speed", column(|r| r.rotation_speed)),
    ];

    let labelled: Vec<&DrillingRecord> = records.iter().filter(|r| r.is_labelled()).collect();
    let dev_az: Vec<f64> = labelled
        .iter()
        .filter_map(|r| r.deviation.map(|d| d.azimuth))
        .collect();
    let dev_inc: Vec<f64> = labelled
        .iter()
        .filter_map(|r| r.deviation.map(|d| d.inclination))
        .collect();

    let mut rock_types: Vec<RockTypeStats> = Vec::new();
    let mut sq_sums: Vec<(f64, usize)> = Vec::new();
    for record in records {
        let idx = match rock_types.iter().position(|s| s.rock_type == record.rock_type) {
            Some(i) => i,
            None => {
                rock_types.push(RockTypeStats {
                    rock_type: record.rock_type.clone(),
                    count: 0,
                    rms_deviation: None,
                });
                sq_sums.push((0.0, 0));
                rock_types.len() - 1
            }
        };
        rock_types[idx].count += 1;
        if let Some(d) = record.deviation {
            sq_sums[idx].0 += d.azimuth * d.azimuth + d.inclination * d.inclination;
            sq_sums[idx].1 += 1;
        }
    }
    for (stats, (sum, n)) in rock_types.iter_mut().zip(&sq_sums) {
        if *n > 0 {
            stats.rms_deviation = Some((sum / *n as f64).sqrt());
        }
    }

    // Correlations need aligned columns, so restrict to labelled rows when
    // deviations are included.
    let correlations = if labelled.len() >= 3 {
        let aligned = |f: fn(&DrillingRecord) -> f64| labelled.iter().map(|r| f(r)).collect::<Vec<f64>>();
        let series: Vec<(&'static str, Vec<f64>)> = vec![
            ("depth_final", aligned(|r| r.depth_final)),
            ("azimuth_initial", aligned(|r| r.azimuth_initial)),
            ("inclination_initial", aligned(|r| r.inclination_initial)),
            ("rotation_speed", aligned(|r| r.rotation_speed)),
            ("deviation_azimuth", dev_az.clone()),
            ("deviation_inclination", dev_inc.clone()),
        ];
        correlate(&series)
    } else {
        let series: Vec<(&'static str, Vec<f64>)> = columns.clone();
        correlate(&series)
    };

    if !dev_az.is_empty() {
        columns.push(("deviation_azimuth", dev_az.clone()));
        columns.push(("deviation_inclination", dev_inc.clone()));
    }

    Ok(DatasetSummary {
        rows: records.len(),
        labelled_rows: labelled.len(),
        columns: columns.iter().map(|(name, v)| column_stats(*name, v)).collect(),
        rock_types,
        mean_abs_azimuth_deviation: mean_abs(&dev_az),
        mean_abs_inclination_deviation: mean_abs(&dev_inc),
        correlations,
    })
}

/// All pairs with `|r| > MIN_REPORTED_CORRELATION`, strongest first.
fn correlate(series: &[(&'static str, Vec<f64>)]) -> Vec<Correlation> {
    let mut found = Vec::new();
    for (i, (a, x)) in series.iter().enumerate() {
        for (b, y) in &series[i + 1..] {
            let r = pearson(x, y);
            if r.abs() > MIN_REPORTED_CORRELATION {
                found.push(Correlation {
                    a: *a,
                    b: *b,
                    r,
                    p_value: p_value_for_r(r, x.len()),
                });
            }
        }
    }
    found.sort_by(|p, q| q.r.abs().total_cmp(&p.r.abs()));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{generate, DemoOptions};

    #[test]
    fn test_pearson_extremes() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&x, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &[8.0, 6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&x, &[5.0; 4]), 0.0);
    }

    #[test]
    fn test_pearson_survives_large_offsets() {
        let x: Vec<f64> = (0..50).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + (v * 1.7).sin()).collect();
        let near = pearson(&x, &y);

        let far_x: Vec<f64> = x.iter().map(|v| v + 1e9).collect();
        let far_y: Vec<f64> = y.iter().map(|v| v + 1e9).collect();
        let far = pearson(&far_x, &far_y);

        assert!(near > 0.99 && near < 1.0);
        assert!((far - near).abs() < 1e-9, "offset shifted r from {near} to {far}");

        let exact: Vec<f64> = far_x.iter().map(|v| 2.0 * v).collect();
        assert!((pearson(&far_x, &exact) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_p_value_behaviour() {
        assert_eq!(p_value_for_r(0.5, 2), 1.0);
        assert_eq!(p_value_for_r(1.0, 50), 0.0);
        let weak = p_value_for_r(0.1, 20);
        let strong = p_value_for_r(0.8, 20);
        assert!(strong < 0.001 && weak > 0.5);
    }

    #[test]
    fn test_demo_summary_finds_depth_effect() {
        let records = generate(DemoOptions { rows: 500, seed: 42 }).expect("generate");
        let summary = summarize(&records).expect("summary");

        assert_eq!(summary.rows, 500);
        assert_eq!(summary.labelled_rows, 500);
        assert_eq!(summary.columns.len(), 6);
        assert_eq!(summary.rock_types.len(), 5);
        assert_eq!(summary.rock_types.iter().map(|r| r.count).sum::<usize>(), 500);
        assert!(summary.mean_abs_azimuth_deviation.is_some());

        // dev_az has a 0.05·depth term with depth spanning 900 m
        assert!(summary
            .correlations
            .iter()
            .any(|c| c.a == "depth_final" && c.b == "deviation_azimuth" && c.r > 0.3));
        let strengths: Vec<f64> = summary.correlations.iter().map(|c| c.r.abs()).collect();
        assert!(strengths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_unlabelled_rows_skip_deviation_stats() {
        let records = vec![
            DrillingRecord::new(100.0, 10.0, -45.0, "Granite", 80.0),
            DrillingRecord::new(200.0, 20.0, -50.0, "Granite", 90.0),
        ];
        let summary = summarize(&records).expect("summary");
        assert_eq!(summary.columns.len(), 4);
        assert!(summary.mean_abs_azimuth_deviation.is_none());
        assert!(summary.rock_types[0].rms_deviation.is_none());
    }
}
