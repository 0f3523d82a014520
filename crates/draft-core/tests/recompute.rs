//! End-to-end recompute behavior of a document

use approx::assert_abs_diff_eq;
use draft_core::{
    Document, FeatureKind, FeatureStatus, LinkSub, PropertyValue, RecomputeError,
};
use glam::DVec3;

fn link(target: &str) -> PropertyValue {
    PropertyValue::Link(Some(LinkSub::new(target)))
}

fn vector(doc: &Document, feature: &str, property: &str) -> DVec3 {
    doc.get_property(feature, property)
        .unwrap()
        .as_vector()
        .unwrap()
}

/// Dimension measuring from the start to the end of `target`
fn measure(doc: &mut Document, name: &str, target: &str) {
    doc.create_feature(FeatureKind::Dimension, name).unwrap();
    doc.set_property(name, "First", link(target)).unwrap();
    doc.set_property(name, "Second", link(target)).unwrap();
}

#[test]
fn test_line_end_point_formula() {
    let mut doc = Document::new("lines");
    let cases = [
        (DVec3::ZERO, 10.0, 0.0),
        (DVec3::new(1.0, -2.0, 0.0), 3.5, 30.0),
        (DVec3::new(-4.0, 0.5, 1.0), 7.0, 135.0),
        (DVec3::new(2.0, 2.0, 0.0), 0.0, 270.0),
        (DVec3::ZERO, 12.25, -60.0),
    ];

    for (i, (start, length, angle)) in cases.iter().enumerate() {
        let name = format!("L{i}");
        doc.create_feature(FeatureKind::Line, &name).unwrap();
        doc.set_property(&name, "StartPoint", PropertyValue::Vector(*start))
            .unwrap();
        doc.set_property(&name, "Length", PropertyValue::Float(*length))
            .unwrap();
        doc.set_property(&name, "Angle", PropertyValue::Float(*angle))
            .unwrap();
    }
    assert!(doc.recompute_all().is_success());

    for (i, (start, length, angle)) in cases.iter().enumerate() {
        let theta = angle.to_radians();
        let expected = *start + DVec3::new(theta.cos(), theta.sin(), 0.0) * *length;
        let end = vector(&doc, &format!("L{i}"), "EndPoint");
        assert_abs_diff_eq!(end.x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(end.y, expected.y, epsilon = 1e-9);
        assert_abs_diff_eq!(end.z, expected.z, epsilon = 1e-9);
    }
}

#[test]
fn test_full_circle() {
    let mut doc = Document::new("circles");
    doc.create_feature(FeatureKind::Circle, "C").unwrap();
    doc.set_property("C", "Radius", PropertyValue::Float(5.0))
        .unwrap();
    doc.recompute_all();

    assert!(doc.is_full_circle("C").unwrap());
    let start = vector(&doc, "C", "StartPoint");
    let end = vector(&doc, "C", "EndPoint");
    assert_abs_diff_eq!(start.x, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(start.y, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(end.x, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(end.y, 0.0, epsilon = 1e-9);

    doc.set_property("C", "LastAngle", PropertyValue::Float(359.0))
        .unwrap();
    assert!(!doc.is_full_circle("C").unwrap());
}

#[test]
fn test_recompute_is_idempotent() {
    let mut doc = Document::new("idempotence");
    doc.create_feature(FeatureKind::Circle, "C").unwrap();
    doc.set_property("C", "FirstAngle", PropertyValue::Float(30.0))
        .unwrap();
    measure(&mut doc, "D", "C");

    let outputs = |doc: &Document| -> Vec<PropertyValue> {
        doc.feature("D")
            .unwrap()
            .properties()
            .iter()
            .map(|p| p.value().clone())
            .collect()
    };

    doc.recompute_feature("D").unwrap();
    let first = outputs(&doc);
    doc.recompute_feature("D").unwrap();
    let second = outputs(&doc);

    assert_eq!(first, second);
}

#[test]
fn test_dirty_propagation_and_order() {
    let mut doc = Document::new("propagation");
    doc.create_feature(FeatureKind::Line, "L").unwrap();
    measure(&mut doc, "D", "L");
    doc.create_feature(FeatureKind::Text, "Note").unwrap();
    doc.recompute_all();
    assert_eq!(doc.dimension_value("D").unwrap(), 10.0);

    doc.set_property("L", "Length", PropertyValue::Float(25.0))
        .unwrap();
    assert!(doc.status("L").unwrap().is_dirty());
    assert!(doc.status("D").unwrap().is_dirty());
    assert!(doc.status("Note").unwrap().is_valid());

    let report = doc.recompute_all();
    assert_eq!(report.order, vec!["L", "D"]);
    assert_abs_diff_eq!(doc.dimension_value("D").unwrap(), 25.0, epsilon = 1e-9);
    assert_eq!(doc.dimension_text("D").unwrap(), "25.00 mm");
}

#[test]
fn test_cycle_is_isolated() {
    let mut doc = Document::new("cycle");
    doc.create_feature(FeatureKind::Line, "L").unwrap();
    doc.create_feature(FeatureKind::Circle, "C").unwrap();
    doc.create_feature(FeatureKind::Dimension, "A").unwrap();
    doc.create_feature(FeatureKind::Dimension, "B").unwrap();
    for prop in ["First", "Second"] {
        doc.set_property("A", prop, link("B")).unwrap();
        doc.set_property("B", prop, link("A")).unwrap();
    }

    let report = doc.recompute_all();

    let expected = FeatureStatus::Error(RecomputeError::DependencyCycle {
        members: vec!["A".into(), "B".into()],
    });
    assert_eq!(report.status("A"), Some(&expected));
    assert_eq!(report.status("B"), Some(&expected));
    assert_eq!(report.status("L"), Some(&FeatureStatus::Valid));
    assert_eq!(report.status("C"), Some(&FeatureStatus::Valid));
    assert_eq!(report.order, vec!["C", "L"]);
}

#[test]
fn test_fixing_cycle_recovers() {
    let mut doc = Document::new("recovery");
    doc.create_feature(FeatureKind::Line, "L").unwrap();
    doc.create_feature(FeatureKind::Dimension, "A").unwrap();
    doc.create_feature(FeatureKind::Dimension, "B").unwrap();
    for prop in ["First", "Second"] {
        doc.set_property("A", prop, link("B")).unwrap();
        doc.set_property("B", prop, link("A")).unwrap();
    }
    doc.recompute_all();
    assert!(doc.status("A").unwrap().is_error());

    for prop in ["First", "Second"] {
        doc.set_property("A", prop, link("L")).unwrap();
    }
    assert!(doc.status("B").unwrap().is_dirty());

    let report = doc.recompute_all();
    assert!(report.is_success());
    assert_eq!(report.order, vec!["A", "B"]);
    assert_eq!(doc.dimension_value("B").unwrap(), 10.0);
}

#[test]
fn test_removal_leaves_unresolved_reference() {
    let mut doc = Document::new("removal");
    doc.create_feature(FeatureKind::Line, "L").unwrap();
    doc.create_feature(FeatureKind::Rectangle, "R").unwrap();
    measure(&mut doc, "D", "L");
    doc.recompute_all();

    doc.remove_feature("L").unwrap();
    assert!(doc.status("D").unwrap().is_dirty());
    assert_eq!(doc.get_property("D", "First").unwrap(), &link("L"));

    let report = doc.recompute_all();
    assert!(matches!(
        report.status("D"),
        Some(FeatureStatus::Error(RecomputeError::UnresolvedReference { .. }))
    ));
    assert_eq!(report.status("R"), Some(&FeatureStatus::Valid));
    assert!(report.status("L").is_none());
}

#[test]
fn test_rectangle_example() {
    let mut doc = Document::new("rectangle");
    doc.create_feature(FeatureKind::Rectangle, "R1").unwrap();
    doc.set_property("R1", "StartPoint", PropertyValue::Vector(DVec3::ZERO))
        .unwrap();
    doc.set_property("R1", "Width", PropertyValue::Float(10.0))
        .unwrap();
    doc.set_property("R1", "Height", PropertyValue::Float(5.0))
        .unwrap();
    doc.recompute_all();

    assert_eq!(
        doc.get_property("R1", "EndPoint").unwrap(),
        &PropertyValue::Vector(DVec3::new(10.0, 5.0, 0.0))
    );
}

#[test]
fn test_upstream_error_and_recovery() {
    let mut doc = Document::new("upstream");
    doc.create_feature(FeatureKind::Rectangle, "R").unwrap();
    measure(&mut doc, "D", "R");
    doc.set_property("R", "Width", PropertyValue::Float(f64::INFINITY))
        .unwrap();

    let report = doc.recompute_all();
    assert!(matches!(
        report.status("R"),
        Some(FeatureStatus::Error(RecomputeError::InvalidGeometry(_)))
    ));
    assert_eq!(
        report.status("D"),
        Some(&FeatureStatus::Error(RecomputeError::UpstreamError("R".into())))
    );

    doc.set_property("R", "Width", PropertyValue::Float(3.0))
        .unwrap();
    assert!(doc.recompute_all().is_success());
    assert_abs_diff_eq!(
        doc.dimension_value("D").unwrap(),
        (3.0f64 * 3.0 + 5.0 * 5.0).sqrt(),
        epsilon = 1e-9
    );
}

#[test]
fn test_vertex_reference() {
    let mut doc = Document::new("vertices");
    let polygon = doc.make_regular_polygon(DVec3::ZERO, 4, 1.0).unwrap();
    doc.create_feature(FeatureKind::Dimension, "Diagonal").unwrap();
    doc.set_property(
        "Diagonal",
        "First",
        PropertyValue::Link(Some(LinkSub::with_sub(&polygon, "Vertex0"))),
    )
    .unwrap();
    doc.set_property(
        "Diagonal",
        "Second",
        PropertyValue::Link(Some(LinkSub::with_sub(&polygon, "Vertex2"))),
    )
    .unwrap();

    doc.recompute_all();
    assert_abs_diff_eq!(doc.dimension_value("Diagonal").unwrap(), 2.0, epsilon = 1e-9);

    doc.set_property(
        "Diagonal",
        "Second",
        PropertyValue::Link(Some(LinkSub::with_sub(&polygon, "Vertex9"))),
    )
    .unwrap();
    let report = doc.recompute_all();
    assert!(matches!(
        report.status("Diagonal"),
        Some(FeatureStatus::Error(RecomputeError::UnresolvedReference { .. }))
    ));
}

#[test]
fn test_invalid_format_spec() {
    let mut doc = Document::new("format");
    doc.create_feature(FeatureKind::Line, "L").unwrap();
    measure(&mut doc, "D", "L");
    doc.set_property("D", "FormatSpec", PropertyValue::String("%d".into()))
        .unwrap();

    let report = doc.recompute_all();
    assert!(matches!(
        report.status("D"),
        Some(FeatureStatus::Error(RecomputeError::InvalidFormat { .. }))
    ));
}

#[test]
fn test_negative_extents_follow_formula() {
    let mut doc = Document::new("signs");
    doc.create_feature(FeatureKind::Rectangle, "R").unwrap();
    doc.set_property("R", "Width", PropertyValue::Float(-10.0))
        .unwrap();
    doc.create_feature(FeatureKind::Circle, "C").unwrap();
    doc.set_property("C", "Radius", PropertyValue::Float(-5.0))
        .unwrap();

    assert!(doc.recompute_all().is_success());
    assert_eq!(vector(&doc, "R", "EndPoint"), DVec3::new(-10.0, 5.0, 0.0));
    assert_abs_diff_eq!(vector(&doc, "C", "StartPoint").x, -5.0, epsilon = 1e-9);
}

#[test]
fn test_oversized_format_fails_only_that_dimension() {
    let mut doc = Document::new("format");
    doc.create_feature(FeatureKind::Line, "L").unwrap();
    measure(&mut doc, "D", "L");
    doc.set_property(
        "D",
        "FormatSpec",
        PropertyValue::String("%99999999999999f".into()),
    )
    .unwrap();

    let report = doc.recompute_all();
    assert!(matches!(
        report.status("D"),
        Some(FeatureStatus::Error(RecomputeError::InvalidFormat { .. }))
    ));
    assert_eq!(report.status("L"), Some(&FeatureStatus::Valid));
}
