//! Convenience builders that create a feature and fill in its inputs

use glam::DVec3;

use super::{Document, DocumentError, DocumentResult};
use crate::feature::{FeatureKind, RecomputeError};
use crate::property::PropertyValue;
use crate::shape::{self, ShapeError};

impl Document {
    /// Create a line from `start` to `end`. Returns the generated name.
    pub fn make_line(&mut self, start: DVec3, end: DVec3) -> DocumentResult<String> {
        let (length, angle) = shape::line::length_and_angle(start, end);
        self.build(
            FeatureKind::Line,
            Ok(()),
            vec![
                ("StartPoint", PropertyValue::Vector(start)),
                ("Length", PropertyValue::Float(length)),
                ("Angle", PropertyValue::Float(angle)),
                ("EndPoint", PropertyValue::Vector(end)),
            ],
        )
    }

    /// Create a full circle
    pub fn make_circle(&mut self, center: DVec3, radius: f64) -> DocumentResult<String> {
        self.build(
            FeatureKind::Circle,
            shape::circle::arc_endpoints(&shape::circle::CircleParams {
                center,
                radius,
                first_angle: 0.0,
                last_angle: 360.0,
            })
            .map(|_| ()),
            vec![
                ("Center", PropertyValue::Vector(center)),
                ("Radius", PropertyValue::Float(radius)),
            ],
        )
    }

    /// Create an axis-aligned rectangle with its first corner at `start`
    pub fn make_rectangle(
        &mut self,
        start: DVec3,
        width: f64,
        height: f64,
    ) -> DocumentResult<String> {
        self.build(
            FeatureKind::Rectangle,
            shape::rectangle::end_point(start, width, height).map(|_| ()),
            vec![
                ("StartPoint", PropertyValue::Vector(start)),
                ("Width", PropertyValue::Float(width)),
                ("Height", PropertyValue::Float(height)),
            ],
        )
    }

    /// Create a regular polygon with `sides` vertices on a circle of `radius`
    pub fn make_regular_polygon(
        &mut self,
        center: DVec3,
        sides: usize,
        radius: f64,
    ) -> DocumentResult<String> {
        let vertices = shape::polygon::regular_vertices(center, sides, radius)
            .map_err(|err| rejected(FeatureKind::Polygon, err))?;
        self.build(
            FeatureKind::Polygon,
            Ok(()),
            vec![
                ("Points", PropertyValue::VectorList(vertices)),
                ("Sides", PropertyValue::Integer(sides as i64)),
                ("Radius", PropertyValue::Float(radius)),
                ("Closed", PropertyValue::Bool(true)),
            ],
        )
    }

    /// Create a feature named after its kind and set `inputs`.
    /// Nothing is created when `checked` is an error.
    fn build(
        &mut self,
        kind: FeatureKind,
        checked: Result<(), ShapeError>,
        inputs: Vec<(&'static str, PropertyValue)>,
    ) -> DocumentResult<String> {
        checked.map_err(|err| rejected(kind, err))?;

        let name = self.unique_name(kind.base_name());
        self.create_feature(kind, &name)?;
        for (property, value) in inputs {
            self.set_property(&name, property, value)?;
        }
        Ok(name)
    }
}

fn rejected(kind: FeatureKind, err: ShapeError) -> DocumentError {
    DocumentError::Recompute {
        feature: kind.base_name().to_string(),
        source: RecomputeError::from(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_make_line() {
        let mut doc = Document::new("test");
        let name = doc
            .make_line(DVec3::new(1.0, 1.0, 0.0), DVec3::new(1.0, 4.0, 0.0))
            .unwrap();
        assert_eq!(name, "Line");

        doc.recompute_all();
        let end = doc.feature(&name).unwrap().properties().vector("EndPoint").unwrap();
        assert_abs_diff_eq!(end.x, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(end.y, 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            doc.feature(&name).unwrap().properties().float("Angle").unwrap(),
            90.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_builders_generate_unique_names() {
        let mut doc = Document::new("test");
        let a = doc.make_circle(DVec3::ZERO, 1.0).unwrap();
        let b = doc.make_circle(DVec3::ZERO, 2.0).unwrap();
        assert_eq!(a, "Circle");
        assert_eq!(b, "Circle001");
    }

    #[test]
    fn test_make_rectangle() {
        let mut doc = Document::new("test");
        let name = doc.make_rectangle(DVec3::ZERO, 10.0, 5.0).unwrap();
        doc.recompute_all();
        assert_eq!(
            doc.get_property(&name, "EndPoint").unwrap(),
            &PropertyValue::Vector(DVec3::new(10.0, 5.0, 0.0))
        );
    }

    #[test]
    fn test_invalid_input_creates_nothing() {
        let mut doc = Document::new("test");
        assert!(matches!(
            doc.make_rectangle(DVec3::ZERO, f64::INFINITY, 5.0),
            Err(DocumentError::Recompute {
                source: RecomputeError::InvalidGeometry(_),
                ..
            })
        ));
        assert!(doc.make_circle(DVec3::ZERO, f64::NAN).is_err());
        assert!(doc.make_regular_polygon(DVec3::ZERO, 2, 1.0).is_err());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_make_regular_polygon() {
        let mut doc = Document::new("test");
        let name = doc.make_regular_polygon(DVec3::ZERO, 4, 2.0).unwrap();
        let points = doc.polygon_points(&name).unwrap();
        assert_eq!(points.len(), 4);
        assert_abs_diff_eq!(points[1].y, 2.0, epsilon = 1e-9);

        doc.recompute_all();
        let end = doc.feature(&name).unwrap().properties().vector("EndPoint").unwrap();
        assert_abs_diff_eq!(end.y, -2.0, epsilon = 1e-9);
    }
}
