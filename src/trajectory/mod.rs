//! Trajectory Reconstruction & Deviation Scoring
//!
//! Turns two predicted angular deviations into a sampled 3-D path and
//! compares it with the straight path at the planned orientation.
//!
//! Two scores are reported independently:
//! - `deviation_magnitude`: angular, `sqrt(dev_az² + dev_inc²)`, drives severity
//! - `final_positional_deviation`: metres between the two endpoints

pub mod geometry;
pub mod severity;

pub use geometry::{clamp_inclination, normalize_azimuth, spherical_to_cartesian};
pub use severity::{DeviationSeverity, SeverityThresholds};

use tracing::debug;

use crate::error::{DriftError, DriftResult};
use crate::types::{TrajectoryResult, TrajectorySample};

/// Reconstruct with the default severity thresholds (5° / 15°).
pub fn reconstruct(
    initial_azimuth: f64,
    initial_inclination: f64,
    depth_final: f64,
    predicted_azimuth_dev: f64,
    predicted_inclination_dev: f64,
    sample_count: usize,
) -> DriftResult<TrajectoryResult> {
    reconstruct_with(
        &SeverityThresholds::default(),
        initial_azimuth,
        initial_inclination,
        depth_final,
        predicted_azimuth_dev,
        predicted_inclination_dev,
        sample_count,
    )
}

/// Reconstruct the predicted and ideal paths.
///
/// The initial azimuth is normalized to `[0, 360)` first, so equivalent
/// bearings (`-30`, `330`, `690`) give the same paths. Azimuth and
/// inclination are then interpolated linearly in depth from the initial
/// orientation to the final one (not along the shortest arc).
///
/// # Errors
/// [`DriftError::InvalidInput`] for `depth_final <= 0`, `sample_count < 2`,
/// an initial inclination outside `[-90, 0]` or any non-finite input.
pub fn reconstruct_with(
    thresholds: &SeverityThresholds,
    initial_azimuth: f64,
    initial_inclination: f64,
    depth_final: f64,
    predicted_azimuth_dev: f64,
    predicted_inclination_dev: f64,
    sample_count: usize,
) -> DriftResult<TrajectoryResult> {
    let inputs = [
        ("initial_azimuth", initial_azimuth),
        ("initial_inclination", initial_inclination),
        ("depth_final", depth_final),
        ("predicted_azimuth_dev", predicted_azimuth_dev),
        ("predicted_inclination_dev", predicted_inclination_dev),
    ];
    if let Some((name, value)) = inputs.iter().find(|(_, v)| !v.is_finite()) {
        return Err(DriftError::InvalidInput(format!("{name} must be finite, got {value}")));
    }
    if depth_final <= 0.0 {
        return Err(DriftError::InvalidInput(format!(
            "depth_final must be positive, got {depth_final}"
        )));
    }
    if sample_count < 2 {
        return Err(DriftError::InvalidInput(format!(
            "sample_count must be at least 2, got {sample_count}"
        )));
    }
    if !(-90.0..=0.0).contains(&initial_inclination) {
        return Err(DriftError::InvalidInput(format!(
            "initial_inclination must be within [-90, 0], got {initial_inclination}"
        )));
    }

    let start_azimuth = normalize_azimuth(initial_azimuth);
    let final_azimuth = normalize_azimuth(initial_azimuth + predicted_azimuth_dev);
    let final_inclination = clamp_inclination(initial_inclination + predicted_inclination_dev);

    let last = (sample_count - 1) as f64;
    let mut predicted_path = Vec::with_capacity(sample_count);
    let mut ideal_path = Vec::with_capacity(sample_count);

    for i in 0..sample_count {
        let depth = if i == sample_count - 1 {
            depth_final
        } else {
            depth_final * i as f64 / last
        };
        let t = depth / depth_final;
        let azimuth = start_azimuth + t * (final_azimuth - start_azimuth);
        let inclination = initial_inclination + t * (final_inclination - initial_inclination);

        predicted_path.push(TrajectorySample {
            depth,
            azimuth,
            inclination,
            position: spherical_to_cartesian(depth, azimuth, inclination),
        });
        ideal_path.push(TrajectorySample {
            depth,
            azimuth: start_azimuth,
            inclination: initial_inclination,
            position: spherical_to_cartesian(depth, start_azimuth, initial_inclination),
        });
    }

    let ideal_endpoint = spherical_to_cartesian(depth_final, start_azimuth, initial_inclination);
    let deviation_magnitude = predicted_azimuth_dev.hypot(predicted_inclination_dev);
    let severity = DeviationSeverity::classify(deviation_magnitude, thresholds);
    let final_positional_deviation = predicted_path
        .last()
        .map_or(0.0, |s| s.position.distance_to(&ideal_endpoint));

    debug!(
        final_azimuth,
        final_inclination,
        deviation_magnitude,
        final_positional_deviation,
        %severity,
        "Trajectory reconstructed"
    );

    Ok(TrajectoryResult {
        initial_azimuth,
        initial_inclination,
        depth_final,
        predicted_azimuth_dev,
        predicted_inclination_dev,
        final_azimuth,
        final_inclination,
        predicted_path,
        ideal_path,
        ideal_endpoint,
        deviation_magnitude,
        severity,
        final_positional_deviation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_azimuth_past_north() {
        let result = reconstruct(350.0, -45.0, 200.0, 20.0, 0.0, 10).expect("reconstruct");
        assert!((result.final_azimuth - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_endpoints_of_sampled_path() {
        let result = reconstruct(45.0, -60.0, 300.0, 4.0, -3.0, 7).expect("reconstruct");
        assert_eq!(result.predicted_path.len(), 7);
        assert_eq!(result.ideal_path.len(), 7);

        let first = result.predicted_path[0];
        assert_eq!(first.depth, 0.0);
        assert_eq!(first.azimuth, 45.0);

        let last = result.predicted_path[6];
        assert_eq!(last.depth, 300.0);
        assert!((last.azimuth - 49.0).abs() < 1e-9);
        assert!((last.inclination + 63.0).abs() < 1e-9);
        assert_eq!(result.severity, DeviationSeverity::Moderate);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = SeverityThresholds {
            moderate_deg: 1.0,
            high_deg: 2.0,
        };
        let result = reconstruct_with(&strict, 0.0, -45.0, 100.0, 3.0, 0.0, 2).expect("reconstruct");
        assert_eq!(result.severity, DeviationSeverity::High);
    }

    #[test]
    fn test_rejects_nan_input() {
        assert!(matches!(
            reconstruct(f64::NAN, -45.0, 100.0, 0.0, 0.0, 10),
            Err(DriftError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_equivalent_bearings_give_identical_paths() {
        let reference = reconstruct(330.0, -45.0, 100.0, 0.0, 0.0, 25).expect("reconstruct");
        for azimuth in [-30.0, 690.0] {
            let result = reconstruct(azimuth, -45.0, 100.0, 0.0, 0.0, 25).expect("reconstruct");
            for (p, q) in result.predicted_path.iter().zip(&reference.predicted_path) {
                assert!(p.position.distance_to(&q.position) < 1e-9);
            }
            assert_eq!(result.final_azimuth, 330.0);
        }
    }

    #[test]
    fn test_full_turn_bearing_stays_on_ideal_path() {
        let result = reconstruct(360.0, -45.0, 100.0, 0.0, 0.0, 25).expect("reconstruct");
        assert_eq!(result.final_azimuth, 0.0);
        assert!(result.predicted_path.iter().all(|s| s.azimuth == 0.0));
        for (p, q) in result.predicted_path.iter().zip(&result.ideal_path) {
            assert!(p.position.distance_to(&q.position) < 1e-9);
        }
    }

    #[test]
    fn test_rejects_inclination_outside_convention() {
        for inclination in [-95.0, 10.0] {
            assert!(matches!(
                reconstruct(45.0, inclination, 100.0, 0.0, 0.0, 10),
                Err(DriftError::InvalidInput(_))
            ));
        }
    }
}
