//! Plain-text rendering of recompute reports and features

use std::io::{self, Write};

use draft_core::{Feature, PropertyValue, RecomputeReport};

/// Write a recompute report: one line per feature, then the order
pub fn write_report(out: &mut impl Write, report: &RecomputeReport) -> io::Result<()> {
    let width = report.statuses.keys().map(String::len).max().unwrap_or(0);
    for (name, status) in &report.statuses {
        writeln!(out, "  {name:<width$}  {status}")?;
    }
    writeln!(out, "order: {}", join_or_dash(&report.order))?;
    if !report.pending.is_empty() {
        writeln!(out, "pending: {}", report.pending.join(", "))?;
    }
    Ok(())
}

/// Write a feature's status and properties, grouped as declared
pub fn write_feature(out: &mut impl Write, feature: &Feature) -> io::Result<()> {
    writeln!(
        out,
        "{} ({}): {}",
        feature.name(),
        feature.type_name(),
        feature.status()
    )?;

    // Groups in order of first appearance
    let mut groups: Vec<&str> = Vec::new();
    for property in feature.properties().iter() {
        if !groups.contains(&property.group()) {
            groups.push(property.group());
        }
    }

    for group in groups {
        writeln!(out, "  [{group}]")?;
        for property in feature.properties().iter().filter(|p| p.group() == group) {
            let value = match property.label() {
                Some(label) => label.to_string(),
                None => format_value(property.value()),
            };
            writeln!(out, "    {} = {}", property.name(), value)?;
        }
    }
    Ok(())
}

fn format_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Float(v) => format!("{v}"),
        PropertyValue::Integer(v) => format!("{v}"),
        PropertyValue::Bool(v) => format!("{v}"),
        PropertyValue::String(s) => format!("{s:?}"),
        PropertyValue::Vector(v) => format!("({}, {}, {})", v.x, v.y, v.z),
        PropertyValue::VectorList(points) => format!("[{} point(s)]", points.len()),
        PropertyValue::Color([r, g, b, a]) => format!("rgba({r}, {g}, {b}, {a})"),
        PropertyValue::Enum(index) => format!("#{index}"),
        PropertyValue::Link(Some(link)) => link.to_string(),
        PropertyValue::Link(None) => String::from("-"),
    }
}

fn join_or_dash(names: &[String]) -> String {
    if names.is_empty() {
        String::from("-")
    } else {
        names.join(", ")
    }
}
