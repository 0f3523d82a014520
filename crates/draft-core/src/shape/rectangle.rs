//! Rectangle geometry

use glam::DVec3;

use super::{ShapeResult, ensure_finite};

/// Opposite corner of an axis-aligned rectangle anchored at `start`.
/// Negative extents grow the rectangle towards -X / -Y.
pub fn end_point(start: DVec3, width: f64, height: f64) -> ShapeResult<DVec3> {
    ensure_finite("Width", width)?;
    ensure_finite("Height", height)?;
    Ok(start + DVec3::new(width, height, 0.0))
}
