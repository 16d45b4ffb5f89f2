//! Angle normalization and spherical-to-Cartesian conversion.
//!
//! Every angle in the crate is stored in degrees; radians appear only inside
//! [`spherical_to_cartesian`].

use crate::types::Point3;

/// Wrap an azimuth into `[0, 360)`.
pub fn normalize_azimuth(azimuth: f64) -> f64 {
    let wrapped = azimuth.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Clamp an inclination into `[-90, 0]` (vertical down to horizontal).
pub fn clamp_inclination(inclination: f64) -> f64 {
    inclination.clamp(-90.0, 0.0)
}

/// Position at `depth` along a straight ray with the given orientation.
///
/// ```text
/// east     = depth · cos(inc) · sin(az)
/// north    = depth · cos(inc) · cos(az)
/// vertical = depth · sin(inc)
/// ```
pub fn spherical_to_cartesian(depth: f64, azimuth_deg: f64, inclination_deg: f64) -> Point3 {
    let az = azimuth_deg.to_radians();
    let inc = inclination_deg.to_radians();
    Point3 {
        east: depth * inc.cos() * az.sin(),
        north: depth * inc.cos() * az.cos(),
        vertical: depth * inc.sin(),
    }
}
