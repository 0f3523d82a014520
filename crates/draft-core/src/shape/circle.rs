//! Circle and arc geometry

use glam::DVec3;

use super::{ShapeResult, ensure_finite};

/// Inputs of a circle or arc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleParams {
    pub center: DVec3,
    pub radius: f64,
    /// Degrees
    pub first_angle: f64,
    /// Degrees
    pub last_angle: f64,
}

/// Point on the circle at `angle_deg`, in the plane of the center
pub fn point_at(center: DVec3, radius: f64, angle_deg: f64) -> DVec3 {
    let angle = angle_deg.to_radians();
    DVec3::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
        center.z,
    )
}

/// First and last angular positions of the arc
pub fn arc_endpoints(params: &CircleParams) -> ShapeResult<(DVec3, DVec3)> {
    ensure_finite("Radius", params.radius)?;
    Ok((
        point_at(params.center, params.radius, params.first_angle),
        point_at(params.center, params.radius, params.last_angle),
    ))
}

/// True when the sweep from `first_angle` to `last_angle` is exactly one turn
pub fn is_full_circle(first_angle: f64, last_angle: f64, tolerance: f64) -> bool {
    (last_angle - first_angle - 360.0).abs() < tolerance
}
