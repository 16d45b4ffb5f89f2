//! Severity bucketing of the angular deviation magnitude.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bucket boundaries in degrees: `< moderate_deg` is low, `>= high_deg` high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub moderate_deg: f64,
    pub high_deg: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            moderate_deg: 5.0,
            high_deg: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationSeverity {
    Low,
    Moderate,
    High,
}

impl DeviationSeverity {
    pub fn classify(magnitude: f64, thresholds: &SeverityThresholds) -> Self {
        if magnitude < thresholds.moderate_deg {
            DeviationSeverity::Low
        } else if magnitude < thresholds.high_deg {
            DeviationSeverity::Moderate
        } else {
            DeviationSeverity::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeviationSeverity::Low => "low",
            DeviationSeverity::Moderate => "moderate",
            DeviationSeverity::High => "high",
        }
    }

    /// Expected impact on the final hole position.
    pub fn impact(&self) -> &'static str {
        match self {
            DeviationSeverity::Low => "minimal",
            DeviationSeverity::Moderate => "worth considering",
            DeviationSeverity::High => "significant",
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            DeviationSeverity::Low => &[
                "Predicted deviation is low and should not require specific adjustments.",
                "Drill according to the planned parameters.",
                "Check orientation regularly during the operation.",
            ],
            DeviationSeverity::Moderate => &[
                "Moderate deviation is expected; consider preventive adjustments.",
                "Consider a slight compensation of the initial orientation.",
                "Plan more frequent survey measurements while drilling.",
                "Reduce rotation speed through critical zones.",
            ],
            DeviationSeverity::High => &[
                "Significant deviation is expected; corrective measures are required.",
                "Adjust the initial orientation substantially to compensate.",
                "Use additional stabilizers to hold the trajectory.",
                "Consider directional drilling techniques if available.",
                "Take very frequent survey measurements.",
            ],
        }
    }
}

impl fmt::Display for DeviationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
