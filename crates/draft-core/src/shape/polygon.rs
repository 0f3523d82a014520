//! Polygon geometry

use std::f64::consts::TAU;

use glam::DVec3;

use super::{ShapeError, ShapeResult, ensure_length};

/// First and last point of an ordered point list, if any
pub fn endpoints(points: &[DVec3]) -> Option<(DVec3, DVec3)> {
    Some((*points.first()?, *points.last()?))
}

/// Vertices of a regular polygon, the first one on the +X axis from `center`
pub fn regular_vertices(center: DVec3, sides: usize, radius: f64) -> ShapeResult<Vec<DVec3>> {
    if sides < 3 {
        return Err(ShapeError::InvalidGeometry(format!(
            "a regular polygon needs at least 3 sides (got {sides})"
        )));
    }
    ensure_length("Radius", radius)?;

    let step = TAU / sides as f64;
    Ok((0..sides)
        .map(|i| {
            let angle = step * i as f64;
            center + DVec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
        })
        .collect())
}
