//! Reconstructed borehole path types

use serde::{Deserialize, Serialize};

use crate::trajectory::DeviationSeverity;

/// Cartesian position relative to the collar (m).
///
/// `vertical` is negative below the collar for downward inclinations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub east: f64,
    pub north: f64,
    pub vertical: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 {
        east: 0.0,
        north: 0.0,
        vertical: 0.0,
    };

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point3) -> f64 {
        let de = self.east - other.east;
        let dn = self.north - other.north;
        let dv = self.vertical - other.vertical;
        (de * de + dn * dn + dv * dv).sqrt()
    }
}

/// One sampled station along a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Measured depth along the hole (m)
    pub depth: f64,
    /// Interpolated azimuth at this depth (degrees)
    pub azimuth: f64,
    /// Interpolated inclination at this depth (degrees)
    pub inclination: f64,
    pub position: Point3,
}

/// Predicted path, ideal straight path and the deviation scores between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryResult {
    pub initial_azimuth: f64,
    pub initial_inclination: f64,
    pub depth_final: f64,
    pub predicted_azimuth_dev: f64,
    pub predicted_inclination_dev: f64,
    /// Normalized to [0, 360)
    pub final_azimuth: f64,
    /// Clamped to [-90, 0]
    pub final_inclination: f64,
    /// Predicted path, depth 0 to `depth_final` inclusive
    pub predicted_path: Vec<TrajectorySample>,
    /// Straight path at the initial orientation, sampled at the same depths
    pub ideal_path: Vec<TrajectorySample>,
    pub ideal_endpoint: Point3,
    /// Angular magnitude of the predicted deviations (degrees)
    pub deviation_magnitude: f64,
    pub severity: DeviationSeverity,
    /// Distance between predicted and ideal endpoints (m)
    pub final_positional_deviation: f64,
}

impl TrajectoryResult {
    /// Last point of the predicted path.
    pub fn predicted_endpoint(&self) -> Point3 {
        self.predicted_path
            .last()
            .map(|s| s.position)
            .unwrap_or(Point3::ORIGIN)
    }
}
