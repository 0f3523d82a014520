//! Feature kinds and their property schemas

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::property::{Property, PropertyValue};

/// Labels of the LineStyle enumeration
pub const LINE_STYLES: &[&str] = &["Solid", "Dashed", "Dotted", "DashDot"];

/// Labels of the Text Justification enumeration
pub const JUSTIFICATIONS: &[&str] = &["Left", "Center", "Right"];

/// The kind of a drawing feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Plain feature with only the common properties
    Base,
    Line,
    Circle,
    Rectangle,
    Polygon,
    Text,
    Dimension,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 7] = [
        FeatureKind::Base,
        FeatureKind::Line,
        FeatureKind::Circle,
        FeatureKind::Rectangle,
        FeatureKind::Polygon,
        FeatureKind::Text,
        FeatureKind::Dimension,
    ];

    /// Get the type name of this kind
    pub fn type_name(&self) -> &'static str {
        match self {
            FeatureKind::Base => "Feature",
            FeatureKind::Line => "Line",
            FeatureKind::Circle => "Circle",
            FeatureKind::Rectangle => "Rectangle",
            FeatureKind::Polygon => "Polygon",
            FeatureKind::Text => "Text",
            FeatureKind::Dimension => "Dimension",
        }
    }

    /// Base name used when a feature of this kind is auto-named
    pub fn base_name(&self) -> &'static str {
        match self {
            FeatureKind::Base => "DrawingFeature",
            other => other.type_name(),
        }
    }

    /// Properties shared by every kind
    pub(crate) fn common_properties() -> Vec<Property> {
        vec![
            Property::new(
                "StartPoint",
                "Geometry",
                "Start point of the drawing object",
                PropertyValue::Vector(DVec3::ZERO),
            ),
            Property::new(
                "EndPoint",
                "Geometry",
                "End point of the drawing object",
                PropertyValue::Vector(DVec3::ZERO),
            ),
            Property::new(
                "LineWidth",
                "Appearance",
                "Width of the line",
                PropertyValue::Float(1.0),
            ),
            Property::new(
                "LineColor",
                "Appearance",
                "Color of the line",
                PropertyValue::Color([0.0, 0.0, 0.0, 0.0]),
            ),
            Property::enumeration("LineStyle", "Appearance", "Style of the line", LINE_STYLES, 0),
            Property::new(
                "Construction",
                "Geometry",
                "Construction geometry flag",
                PropertyValue::Bool(false),
            ),
        ]
    }

    /// Properties specific to this kind, with their defaults
    pub(crate) fn kind_properties(&self, config: &EngineConfig) -> Vec<Property> {
        match self {
            FeatureKind::Base => Vec::new(),

            FeatureKind::Line => vec![
                Property::new(
                    "Length",
                    "Dimensions",
                    "Length of the line",
                    PropertyValue::Float(10.0),
                ),
                Property::new(
                    "Angle",
                    "Dimensions",
                    "Angle of the line in degrees",
                    PropertyValue::Float(0.0),
                ),
            ],

            FeatureKind::Circle => vec![
                Property::new(
                    "Center",
                    "Geometry",
                    "Center point of the circle",
                    PropertyValue::Vector(DVec3::ZERO),
                ),
                Property::new(
                    "Radius",
                    "Dimensions",
                    "Radius of the circle",
                    PropertyValue::Float(5.0),
                ),
                Property::new(
                    "FirstAngle",
                    "Dimensions",
                    "First angle of arc in degrees",
                    PropertyValue::Float(0.0),
                ),
                Property::new(
                    "LastAngle",
                    "Dimensions",
                    "Last angle of arc in degrees",
                    PropertyValue::Float(360.0),
                ),
            ],

            FeatureKind::Rectangle => vec![
                Property::new(
                    "Width",
                    "Dimensions",
                    "Width of the rectangle",
                    PropertyValue::Float(10.0),
                ),
                Property::new(
                    "Height",
                    "Dimensions",
                    "Height of the rectangle",
                    PropertyValue::Float(5.0),
                ),
                Property::new(
                    "Rounded",
                    "Geometry",
                    "Create rounded corners",
                    PropertyValue::Bool(false),
                ),
                Property::new(
                    "CornerRadius",
                    "Dimensions",
                    "Radius of rounded corners",
                    PropertyValue::Float(1.0),
                ),
            ],

            FeatureKind::Polygon => vec![
                Property::new(
                    "Points",
                    "Geometry",
                    "Points defining the polygon",
                    PropertyValue::VectorList(Vec::new()),
                ),
                Property::new(
                    "Sides",
                    "Dimensions",
                    "Number of sides for regular polygon",
                    PropertyValue::Integer(6),
                ),
                Property::new(
                    "Radius",
                    "Dimensions",
                    "Radius for regular polygon",
                    PropertyValue::Float(5.0),
                ),
                Property::new(
                    "Closed",
                    "Geometry",
                    "Whether polygon is closed",
                    PropertyValue::Bool(true),
                ),
            ],

            FeatureKind::Text => vec![
                Property::new(
                    "TextString",
                    "Content",
                    "Text content",
                    PropertyValue::String(String::from("Text")),
                ),
                Property::new(
                    "FontName",
                    "Font",
                    "Font name",
                    PropertyValue::String(String::from("Arial")),
                ),
                Property::new("FontSize", "Font", "Font size", PropertyValue::Float(12.0)),
                Property::new(
                    "Position",
                    "Placement",
                    "Text position",
                    PropertyValue::Vector(DVec3::ZERO),
                ),
                Property::new(
                    "Rotation",
                    "Placement",
                    "Text rotation angle",
                    PropertyValue::Float(0.0),
                ),
                Property::enumeration(
                    "Justification",
                    "Font",
                    "Text justification",
                    JUSTIFICATIONS,
                    0,
                ),
            ],

            FeatureKind::Dimension => vec![
                Property::new(
                    "First",
                    "References",
                    "First measurement point",
                    PropertyValue::Link(None),
                ),
                Property::new(
                    "Second",
                    "References",
                    "Second measurement point",
                    PropertyValue::Link(None),
                ),
                Property::new(
                    "DimLinePosition",
                    "Dimension",
                    "Position of dimension line",
                    PropertyValue::Vector(DVec3::ZERO),
                ),
                Property::new(
                    "FormatSpec",
                    "Dimension",
                    "Format specification for dimension text",
                    PropertyValue::String(config.default_format_spec.clone()),
                ),
                Property::new(
                    "TextSize",
                    "Dimension",
                    "Size of dimension text",
                    PropertyValue::Float(3.0),
                ),
                Property::new(
                    "ShowUnits",
                    "Dimension",
                    "Show measurement units",
                    PropertyValue::Bool(true),
                ),
                Property::new(
                    "Value",
                    "Dimension",
                    "Measured distance (computed)",
                    PropertyValue::Float(0.0),
                ),
                Property::new(
                    "DimensionText",
                    "Dimension",
                    "Rendered dimension text (computed)",
                    PropertyValue::String(String::new()),
                ),
            ],
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_property_names_unique() {
        let config = EngineConfig::default();
        for kind in FeatureKind::ALL {
            let mut names: Vec<_> = FeatureKind::common_properties()
                .into_iter()
                .chain(kind.kind_properties(&config))
                .map(|p| p.name())
                .collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate property in {kind}");
        }
    }

    #[test]
    fn test_dimension_uses_configured_format() {
        let config = EngineConfig::default().with_format_spec("%.3f");
        let props = FeatureKind::Dimension.kind_properties(&config);
        let spec = props.iter().find(|p| p.name() == "FormatSpec").unwrap();
        assert_eq!(spec.value(), &PropertyValue::String("%.3f".into()));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(FeatureKind::Base.base_name(), "DrawingFeature");
        assert_eq!(FeatureKind::Circle.base_name(), "Circle");
    }
}
