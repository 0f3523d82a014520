//! Linear dimension geometry

use glam::DVec3;

use super::{ShapeError, ShapeResult, format_value};

/// Inputs of a linear dimension, with both reference points already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionParams<'a> {
    pub first: DVec3,
    pub second: DVec3,
    pub format_spec: &'a str,
    pub show_units: bool,
    pub unit: &'a str,
}

/// Measured value and its rendered label
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub text: String,
}

/// Measure the distance between the two points and render it
pub fn measure(params: &DimensionParams<'_>) -> ShapeResult<Measurement> {
    let value = params.first.distance(params.second);
    if !value.is_finite() {
        return Err(ShapeError::InvalidGeometry(String::from(
            "dimension distance is not finite",
        )));
    }

    let mut text =
        format_value(params.format_spec, value).map_err(|source| ShapeError::InvalidFormat {
            spec: params.format_spec.to_string(),
            source,
        })?;
    if params.show_units && !params.unit.is_empty() {
        text.push(' ');
        text.push_str(params.unit);
    }

    Ok(Measurement { value, text })
}
