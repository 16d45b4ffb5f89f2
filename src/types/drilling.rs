//! Drilling record types

use serde::{Deserialize, Serialize};

/// Rock type assigned when a dataset carries no lithology column.
pub const UNKNOWN_ROCK_TYPE: &str = "Unknown";

/// Measured deviation of a drill hole from its planned orientation (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationLabels {
    /// Signed azimuth deviation (degrees)
    pub azimuth: f64,
    /// Signed inclination deviation (degrees)
    pub inclination: f64,
}

/// One drill hole observation.
///
/// Training records carry both deviation labels; inference records carry none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillingRecord {
    /// Final depth of the hole (m)
    pub depth_final: f64,
    /// Planned azimuth at the collar (degrees, 0-360)
    pub azimuth_initial: f64,
    /// Planned inclination at the collar (degrees, -90 vertical to 0 horizontal)
    pub inclination_initial: f64,
    /// Lithology of the drilled interval
    pub rock_type: String,
    /// Rod rotation speed (rpm)
    pub rotation_speed: f64,
    /// Measured deviations, present on training records only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<DeviationLabels>,
}

impl DrillingRecord {
    /// Build an inference record (no labels).
    pub fn new(
        depth_final: f64,
        azimuth_initial: f64,
        inclination_initial: f64,
        rock_type: impl Into<String>,
        rotation_speed: f64,
    ) -> Self {
        Self {
            depth_final,
            azimuth_initial,
            inclination_initial,
            rock_type: rock_type.into(),
            rotation_speed,
            deviation: None,
        }
    }

    /// Attach measured deviations, turning this into a training record.
    #[must_use]
    pub fn with_deviation(mut self, azimuth: f64, inclination: f64) -> Self {
        self.deviation = Some(DeviationLabels { azimuth, inclination });
        self
    }

    /// Continuous inputs in canonical feature order.
    pub fn numeric_inputs(&self) -> [f64; 4] {
        [
            self.depth_final,
            self.azimuth_initial,
            self.inclination_initial,
            self.rotation_speed,
        ]
    }

    /// Whether both deviation labels are present.
    pub fn is_labelled(&self) -> bool {
        self.deviation.is_some()
    }
}

/// The two predicted angular deviations for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedDeviation {
    pub azimuth: f64,
    pub inclination: f64,
}
