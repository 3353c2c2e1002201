//! Tuning/matching plane coordinates
//!
//! The plane is abstract: x and y have no physical unit. The probe position is
//! never stored on its own; it is always derived from the session origin plus
//! the accumulated knob offsets projected onto the two control axes.

use super::config::ControlConfig;

/// Position in the tuning/matching plane
/// - .0 = x
/// - .1 = y
pub type PlanePos = (f64, f64);

/// Unit vector of an axis given in degrees
#[inline]
pub fn axis_direction(angle_deg: f64) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    (rad.cos(), rad.sin())
}

/// Probe position for the given offsets
pub fn probe_position(
    origin: PlanePos,
    tuning_offset: f64,
    matching_offset: f64,
    config: &ControlConfig,
) -> PlanePos {
    let t = axis_direction(config.tuning_angle_deg);
    let m = axis_direction(config.matching_angle_deg);
    (
        origin.0 + t.0 * tuning_offset + m.0 * matching_offset,
        origin.1 + t.1 * tuning_offset + m.1 * matching_offset,
    )
}

#[inline]
pub fn distance(a: PlanePos, b: PlanePos) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
