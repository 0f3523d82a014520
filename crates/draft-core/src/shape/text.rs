//! Text anchor geometry
//!
//! A text anchor has no extent: both endpoints sit on its position.

use glam::DVec3;

pub fn anchor(position: DVec3) -> (DVec3, DVec3) {
    (position, position)
}
