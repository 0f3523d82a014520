//! Line geometry

use glam::DVec3;

/// Unit direction for an angle in degrees, in the XY plane
pub fn direction_from_angle(angle_deg: f64) -> DVec3 {
    let angle = angle_deg.to_radians();
    DVec3::new(angle.cos(), angle.sin(), 0.0)
}

/// End point of a line starting at `start` with the given length and angle (degrees)
pub fn end_point(start: DVec3, length: f64, angle_deg: f64) -> DVec3 {
    start + direction_from_angle(angle_deg) * length
}

/// Normalized direction from `start` to `end`; zero when the points coincide
pub fn direction(start: DVec3, end: DVec3) -> DVec3 {
    (end - start).normalize_or_zero()
}

/// Length and angle (degrees) of the segment from `start` to `end`
pub fn length_and_angle(start: DVec3, end: DVec3) -> (f64, f64) {
    let diff = end - start;
    (diff.length(), diff.y.atan2(diff.x).to_degrees())
}
